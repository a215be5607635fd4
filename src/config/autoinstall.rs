// file: src/config/autoinstall.rs
// version: 1.0.0
// guid: b7e4f2a0-8c3d-49e1-a652-0f9d1c8b7a34

//! Autoinstall document wire types
//!
//! These structs mirror the nested shape the Ubuntu installer reads. Field
//! declaration order is the serialization order, so the document renders
//! with stable keys on every run.

use serde::Serialize;

/// Top-level cloud-config document carrying the autoinstall plan
#[derive(Debug, Clone, Serialize)]
pub struct CloudConfig {
    pub autoinstall: Autoinstall,
}

/// The unattended-install plan
#[derive(Debug, Clone, Serialize)]
pub struct Autoinstall {
    pub version: u32,
    pub timezone: String,
    pub locale: String,
    pub keyboard: Keyboard,
    #[serde(rename = "user-data")]
    pub user_data: UserData,
    pub ssh: Ssh,
    pub storage: Storage,
    pub packages: Vec<String>,
    #[serde(rename = "late-commands")]
    pub late_commands: Vec<String>,
    pub shutdown: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Keyboard {
    pub layout: String,
}

/// Identity block: hostname plus the users the installer creates
#[derive(Debug, Clone, Serialize)]
pub struct UserData {
    pub hostname: String,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub name: String,
    pub passwd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_group: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    pub lock_passwd: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_authorized_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sudo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

/// SSH access block. `allow_pw` and `authorized_keys` are mutually
/// exclusive by construction; see [`super::document::SshAccess`].
#[derive(Debug, Clone, Serialize)]
pub struct Ssh {
    #[serde(rename = "install-server")]
    pub install_server: bool,
    #[serde(rename = "allow-pw")]
    pub allow_pw: bool,
    #[serde(rename = "authorized-keys", skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
}

/// Storage plan: a named layout shorthand or an explicit operation sequence
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Storage {
    Layout { layout: LvmLayout },
    Explicit { config: Vec<StorageOp> },
}

/// Named LVM layout keyed by a disk serial match pattern
#[derive(Debug, Clone, Serialize)]
pub struct LvmLayout {
    pub name: String,
    #[serde(rename = "match")]
    pub disk_match: DiskMatch,
    /// Volume encryption passphrase, when full-disk encryption is requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskMatch {
    pub serial: String,
}

/// Partition size: a suffixed size string or -1 for the remainder
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PartSize {
    Remainder(i64),
    Size(String),
}

impl PartSize {
    pub fn remainder() -> Self {
        PartSize::Remainder(-1)
    }

    pub fn of(size: &str) -> Self {
        PartSize::Size(size.to_string())
    }
}

/// One typed record of the explicit storage plan. Records reference earlier
/// records by id, so the emitting order is a hard dependency order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StorageOp {
    #[serde(rename = "disk")]
    Disk {
        id: String,
        serial: String,
        ptable: String,
        wipe: String,
        grub_device: bool,
    },
    #[serde(rename = "partition")]
    Partition {
        id: String,
        device: String,
        size: PartSize,
        #[serde(skip_serializing_if = "Option::is_none")]
        flag: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        grub_device: Option<bool>,
    },
    #[serde(rename = "format")]
    Format {
        id: String,
        volume: String,
        fstype: String,
    },
    #[serde(rename = "dm_crypt")]
    DmCrypt {
        id: String,
        volume: String,
        key: String,
        dm_name: String,
    },
    #[serde(rename = "lvm_volgroup")]
    LvmVolGroup {
        id: String,
        name: String,
        devices: Vec<String>,
    },
    #[serde(rename = "lvm_partition")]
    LvmPartition {
        id: String,
        volgroup: String,
        name: String,
        size: String,
    },
    #[serde(rename = "mount")]
    Mount {
        id: String,
        device: String,
        path: String,
    },
}

impl StorageOp {
    /// The record's own identifier
    pub fn id(&self) -> &str {
        match self {
            StorageOp::Disk { id, .. }
            | StorageOp::Partition { id, .. }
            | StorageOp::Format { id, .. }
            | StorageOp::DmCrypt { id, .. }
            | StorageOp::LvmVolGroup { id, .. }
            | StorageOp::LvmPartition { id, .. }
            | StorageOp::Mount { id, .. } => id,
        }
    }

    /// Identifiers of records this record depends on
    pub fn references(&self) -> Vec<&str> {
        match self {
            StorageOp::Disk { .. } => vec![],
            StorageOp::Partition { device, .. } => vec![device.as_str()],
            StorageOp::Format { volume, .. } => vec![volume.as_str()],
            StorageOp::DmCrypt { volume, .. } => vec![volume.as_str()],
            StorageOp::LvmVolGroup { devices, .. } => {
                devices.iter().map(String::as_str).collect()
            }
            StorageOp::LvmPartition { volgroup, .. } => vec![volgroup.as_str()],
            StorageOp::Mount { device, .. } => vec![device.as_str()],
        }
    }
}

impl Storage {
    /// Check that every reference in an explicit plan points at an earlier
    /// record. A forward reference would leave the installer with a dangling
    /// identifier, so this is a build-time invariant.
    pub fn verify_dependency_order(&self) -> crate::Result<()> {
        let Storage::Explicit { config } = self else {
            return Ok(());
        };

        let mut seen: Vec<&str> = Vec::with_capacity(config.len());
        for op in config {
            for reference in op.references() {
                if !seen.contains(&reference) {
                    return Err(crate::error::IsoBuildError::ValidationError(format!(
                        "Storage record '{}' references '{}' before it is defined",
                        op.id(),
                        reference
                    )));
                }
            }
            seen.push(op.id());
        }

        Ok(())
    }
}
