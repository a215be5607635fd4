// file: src/image/mod.rs
// version: 1.0.0
// guid: d1f3a5b7-9c20-4e82-b4d6-f8a0c2e4b617

//! Image handling: unpacking the source ISO, injecting the autoinstall
//! configuration, patching the boot menu, extracting hybrid boot records
//! and composing the final image.

pub mod boot_records;
pub mod composer;
pub mod grub;
pub mod injector;
pub mod unpacker;

pub use boot_records::BootRecordSet;

use std::path::{Path, PathBuf};

/// Root-level autoinstall configuration file
pub const AUTOINSTALL_FILE: &str = "autoinstall.yaml";
/// Secondary nocloud datasource directory
pub const NOCLOUD_DIR: &str = "nocloud";
/// Boot-loader menu file inside the tree
pub const GRUB_CFG: &str = "boot/grub/grub.cfg";
/// Where the extracted UEFI boot image lands inside the tree
pub const EFI_IMAGE: &str = "boot/grub/efi.img";
/// Well-known legacy BIOS El Torito boot loader path
pub const BIOS_BOOT_IMAGE: &str = "boot/grub/i386-pc/eltorito.img";

/// The unpacked file hierarchy of the source image, exclusively owned by
/// one pipeline run and mutated in place by the injection and patch steps
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
}

impl WorkingTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn autoinstall_file(&self) -> PathBuf {
        self.root.join(AUTOINSTALL_FILE)
    }

    pub fn nocloud_dir(&self) -> PathBuf {
        self.root.join(NOCLOUD_DIR)
    }

    pub fn grub_cfg(&self) -> PathBuf {
        self.root.join(GRUB_CFG)
    }

    pub fn efi_image(&self) -> PathBuf {
        self.root.join(EFI_IMAGE)
    }
}
