// file: src/config/document.rs
// version: 1.0.0
// guid: c2d9a6e1-4f70-4b85-b3c8-7a1e59d02f46

//! Autoinstall document builder
//!
//! Maps [`InstallParams`] to the one matching document shape. The two
//! conditional axes (password-vs-keys authentication, simple-vs-explicit
//! storage) are modelled as variants so the builder cannot emit an
//! inconsistent combination.

use super::autoinstall::{
    Autoinstall, CloudConfig, DiskMatch, Keyboard, LvmLayout, PartSize, Ssh, Storage, StorageOp,
    User, UserData,
};
use super::{InstallParams, ServiceToken, StoragePolicy};
use crate::utils::crypto;
use crate::Result;
use tracing::{debug, info};

/// Placeholder token substituted with the admin username in late commands
const USERNAME_PLACEHOLDER: &str = "{{username}}";

/// Packages installed for every variant
const BASE_PACKAGES: &[&str] = &[
    "vim",
    "curl",
    "git",
    "htop",
    "net-tools",
    "ca-certificates",
    "build-essential",
];

/// Packages added when full-disk encryption is requested
const ENCRYPTION_PACKAGES: &[&str] = &["cryptsetup", "cryptsetup-initramfs"];

/// Boot-time key file enrolled into the encrypted volume
const LUKS_KEYFILE: &str = "/etc/luks/os.keyfile";

/// Immutable late-command template. Order is a contract: directories are
/// created before files are written into them, the first-boot script exists
/// before the unit that runs it, and the unit is installed before it is
/// enabled.
const LATE_COMMAND_TEMPLATES: &[&str] = &[
    // First-boot script, run once by a oneshot unit
    "curtin in-target -- mkdir -p /opt/post-install",
    "curtin in-target -- sh -c \"cat > /opt/post-install/first-boot.sh << 'FIRSTBOOT'\n#!/bin/bash\necho 'Running first boot configuration...' >> /var/log/first-boot.log\nchown -R {{username}}:{{username}} /home/{{username}}\napt-get update && apt-get upgrade -y\nsystemctl disable first-boot.service\necho \\\"First boot completed at \\$(date)\\\" >> /var/log/first-boot.log\nFIRSTBOOT\n\"",
    "curtin in-target -- chmod +x /opt/post-install/first-boot.sh",
    "curtin in-target -- sh -c \"cat > /etc/systemd/system/first-boot.service << 'SERVICE'\n[Unit]\nDescription=First Boot Configuration\nAfter=multi-user.target\n\n[Service]\nType=oneshot\nExecStart=/opt/post-install/first-boot.sh\nRemainAfterExit=yes\n\n[Install]\nWantedBy=default.target\nSERVICE\n\"",
    "curtin in-target -- systemctl enable first-boot.service",
    // Shell profile for the admin user
    "curtin in-target -- mkdir -p /home/{{username}}",
    "curtin in-target -- sh -c \"cat >> /home/{{username}}/.bashrc << 'BASHRC'\nexport EDITOR=vim\nalias ll='ls -lah'\nalias update='sudo apt-get update && sudo apt-get upgrade'\nBASHRC\n\"",
    // Boot loader defaults
    "curtin in-target -- sed -i 's|GRUB_CMDLINE_LINUX_DEFAULT=.*|GRUB_CMDLINE_LINUX_DEFAULT=\"nosplash\"|' /etc/default/grub",
    "curtin in-target -- update-grub",
];

/// Authentication variants for the ssh block. A non-empty key set always
/// means keys-only; password login is never combined with authorized keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshAccess {
    PasswordLogin,
    KeysOnly(Vec<String>),
}

impl SshAccess {
    /// Derive the variant from the supplied key set
    pub fn from_keys(keys: &[String]) -> Self {
        if keys.is_empty() {
            SshAccess::PasswordLogin
        } else {
            SshAccess::KeysOnly(keys.to_vec())
        }
    }

    fn into_wire(self) -> Ssh {
        match self {
            SshAccess::PasswordLogin => Ssh {
                install_server: true,
                allow_pw: true,
                authorized_keys: vec![],
            },
            SshAccess::KeysOnly(keys) => Ssh {
                install_server: true,
                allow_pw: false,
                authorized_keys: keys,
            },
        }
    }
}

/// Build the autoinstall document from validated installation parameters.
///
/// The plaintext admin password is hashed here, exactly once; everything
/// downstream sees only the hash.
pub fn build_cloud_config(params: &InstallParams) -> Result<CloudConfig> {
    info!("Building autoinstall document for {}", params.hostname);

    let password_hash = crypto::hash_password(&params.admin_password)?;

    let storage = match params.storage_policy {
        StoragePolicy::Simple => simple_layout(
            &params.disk_serial,
            params.encryption_passphrase.as_deref(),
        ),
        StoragePolicy::Explicit => explicit_layout(
            &params.disk_serial,
            params.encryption_passphrase.as_deref(),
        ),
    };
    storage.verify_dependency_order()?;

    let mut packages: Vec<String> = BASE_PACKAGES.iter().map(|p| p.to_string()).collect();
    if params.encryption_passphrase.is_some() {
        packages.extend(ENCRYPTION_PACKAGES.iter().map(|p| p.to_string()));
    }

    let late_commands = build_late_commands(params);
    debug!("Document carries {} late commands", late_commands.len());

    Ok(CloudConfig {
        autoinstall: Autoinstall {
            version: 1,
            timezone: "Etc/UTC".to_string(),
            locale: "en_US.UTF-8".to_string(),
            keyboard: Keyboard {
                layout: "us".to_string(),
            },
            user_data: UserData {
                hostname: params.hostname.clone(),
                users: vec![User {
                    name: params.admin_username.clone(),
                    passwd: password_hash,
                    primary_group: Some(params.admin_username.clone()),
                    groups: vec!["sudo".to_string()],
                    lock_passwd: false,
                    ssh_authorized_keys: params.ssh_keys.clone(),
                    sudo: Some("ALL=(ALL) NOPASSWD:ALL".to_string()),
                    shell: Some("/bin/bash".to_string()),
                }],
            },
            ssh: SshAccess::from_keys(&params.ssh_keys).into_wire(),
            storage,
            packages,
            late_commands,
            shutdown: "reboot".to_string(),
        },
    })
}

/// Simple policy: reference the installer's LVM layout, matching the target
/// disk by serial substring
fn simple_layout(disk_serial: &str, passphrase: Option<&str>) -> Storage {
    Storage::Layout {
        layout: LvmLayout {
            name: "lvm".to_string(),
            disk_match: DiskMatch {
                serial: format!("*{}*", disk_serial),
            },
            password: passphrase.map(str::to_string),
        },
    }
}

/// Explicit policy: a fully ordered storage-operation sequence. Each record
/// references only records emitted before it; when no passphrase is given
/// the volume group sits directly on the OS partition.
fn explicit_layout(disk_serial: &str, passphrase: Option<&str>) -> Storage {
    let mut config = vec![
        StorageOp::Disk {
            id: "disk-os".to_string(),
            serial: disk_serial.to_string(),
            ptable: "gpt".to_string(),
            wipe: "superblock-recursive".to_string(),
            grub_device: true,
        },
        StorageOp::Partition {
            id: "partition-efi".to_string(),
            device: "disk-os".to_string(),
            size: PartSize::of("1G"),
            flag: Some("boot".to_string()),
            grub_device: Some(true),
        },
        StorageOp::Partition {
            id: "partition-os".to_string(),
            device: "disk-os".to_string(),
            size: PartSize::remainder(),
            flag: None,
            grub_device: None,
        },
        StorageOp::Format {
            id: "format-efi".to_string(),
            volume: "partition-efi".to_string(),
            fstype: "fat32".to_string(),
        },
    ];

    let vg_device = if let Some(key) = passphrase {
        config.push(StorageOp::DmCrypt {
            id: "crypt-os".to_string(),
            volume: "partition-os".to_string(),
            key: key.to_string(),
            dm_name: "os_crypt".to_string(),
        });
        "crypt-os"
    } else {
        "partition-os"
    };

    config.extend([
        StorageOp::LvmVolGroup {
            id: "vg-ubuntu".to_string(),
            name: "ubuntu-vg".to_string(),
            devices: vec![vg_device.to_string()],
        },
        StorageOp::LvmPartition {
            id: "lv-root".to_string(),
            volgroup: "vg-ubuntu".to_string(),
            name: "ubuntu-lv".to_string(),
            size: "100%".to_string(),
        },
        StorageOp::Format {
            id: "format-root".to_string(),
            volume: "lv-root".to_string(),
            fstype: "ext4".to_string(),
        },
        StorageOp::Mount {
            id: "mount-root".to_string(),
            device: "format-root".to_string(),
            path: "/".to_string(),
        },
        StorageOp::Mount {
            id: "mount-efi".to_string(),
            device: "format-efi".to_string(),
            path: "/boot/efi".to_string(),
        },
    ]);

    Storage::Explicit { config }
}

/// Assemble the ordered late-command list: the substituted template, then
/// service token writes, then (when encrypting) the key-enrollment sequence
fn build_late_commands(params: &InstallParams) -> Vec<String> {
    let mut commands = substitute_username(LATE_COMMAND_TEMPLATES, &params.admin_username);

    commands.extend(token_commands(&params.service_tokens));

    if let Some(passphrase) = params.encryption_passphrase.as_deref() {
        commands.extend(encryption_commands(passphrase));
    }

    commands
}

/// Single substitution pass over the immutable template sequence
fn substitute_username(templates: &[&str], username: &str) -> Vec<String> {
    templates
        .iter()
        .map(|t| t.replace(USERNAME_PLACEHOLDER, username))
        .collect()
}

/// Commands that persist service claim tokens in the installed system.
/// The directory is created before any token file is written.
fn token_commands(tokens: &[ServiceToken]) -> Vec<String> {
    if tokens.is_empty() {
        return vec![];
    }

    let mut commands = vec!["curtin in-target -- install -d -m 0750 /etc/opt/services".to_string()];
    for token in tokens {
        commands.push(format!(
            "curtin in-target -- sh -c 'printf %s {} > /etc/opt/services/{}.token && chmod 0640 /etc/opt/services/{}.token'",
            shell_quote(&token.value),
            token.name,
            token.name
        ));
    }
    commands
}

/// Boot-time auto-unlock enrollment. The order is correctness-critical:
/// key directory, key file, key registration, crypttab mapping, initramfs
/// rebuild. Skipping or reordering any step leaves the system unable to
/// unlock at boot.
fn encryption_commands(passphrase: &str) -> Vec<String> {
    vec![
        "curtin in-target -- mkdir -p -m 0700 /etc/luks".to_string(),
        format!(
            "curtin in-target -- bash -c 'dd if=/dev/urandom of={} bs=512 count=4 && chmod 0400 {}'",
            LUKS_KEYFILE, LUKS_KEYFILE
        ),
        format!(
            "curtin in-target -- bash -c 'printf %s {} | cryptsetup luksAddKey \"$(blkid -t TYPE=crypto_LUKS -o device | head -n1)\" {}'",
            shell_quote(passphrase),
            LUKS_KEYFILE
        ),
        format!(
            "curtin in-target -- sed -i 's|none|{}|' /etc/crypttab",
            LUKS_KEYFILE
        ),
        "curtin in-target -- update-initramfs -u -k all".to_string(),
    ]
}

/// Quote a value for safe embedding in a single-quoted shell string
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}
