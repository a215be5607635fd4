// file: src/image/composer.rs
// version: 1.0.0
// guid: c9e1f3a5-7b26-4d08-92c4-b6d8e0f2a413

//! Final image composition
//!
//! Re-packs the mutated working tree into a hybrid BIOS/UEFI bootable
//! image via xorriso's mkisofs emulation. The composed image carries two
//! El Torito boot entries (legacy BIOS and UEFI) and, when the source MBR
//! survived extraction, an isohybrid MBR so the image also boots from a
//! raw-written USB stick.

use super::{BootRecordSet, WorkingTree, BIOS_BOOT_IMAGE, EFI_IMAGE};
use crate::{IsoBuildError, Result};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

/// Volume label of the composed image
const VOLUME_LABEL: &str = "Ubuntu Autoinstall";

/// Compose the output image from the working tree and extracted boot records
pub async fn compose(
    tree: &WorkingTree,
    boot_records: &BootRecordSet,
    output_iso: &Path,
) -> Result<()> {
    if let Some(parent) = output_iso.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    info!("Composing bootable image at {}", output_iso.display());

    let mut command = Command::new("xorriso");
    command
        .arg("-as")
        .arg("mkisofs")
        .arg("-r")
        .arg("-V")
        .arg(VOLUME_LABEL)
        .arg("-J")
        .arg("-joliet-long")
        .arg("-o")
        .arg(output_iso)
        // Legacy BIOS boot entry
        .arg("-b")
        .arg(BIOS_BOOT_IMAGE)
        .arg("-c")
        .arg("boot.catalog")
        .arg("-no-emul-boot")
        .arg("-boot-load-size")
        .arg("4")
        .arg("-boot-info-table")
        // UEFI boot entry
        .arg("-eltorito-alt-boot")
        .arg("-e")
        .arg(EFI_IMAGE)
        .arg("-no-emul-boot")
        .arg("-isohybrid-gpt-basdat");

    if let Some(mbr) = &boot_records.mbr {
        command.arg("-isohybrid-mbr").arg(mbr);
    } else {
        debug!("No extracted MBR, composing without isohybrid MBR");
    }

    command.arg(tree.root());

    let output = command.output().await?;

    if !output.status.success() {
        return Err(IsoBuildError::ComposeError(format!(
            "xorriso -as mkisofs failed (exit {:?}): {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let size = fs::metadata(output_iso).await?.len();
    info!(
        "Image composed: {} ({} MB)",
        output_iso.display(),
        size / (1024 * 1024)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_compose_fails_on_empty_tree() {
        // xorriso refuses a tree missing the boot images; the failure must
        // surface as a composition error with the tool's stderr attached
        if which::which("xorriso").is_err() {
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let tree = WorkingTree::new(temp_dir.path().join("tree"));
        fs::create_dir_all(tree.root()).await.unwrap();
        let records = BootRecordSet {
            mbr: None,
            efi_image: PathBuf::from("/nonexistent/efi.img"),
        };

        let result = compose(&tree, &records, &temp_dir.path().join("out.iso")).await;

        assert!(matches!(result, Err(IsoBuildError::ComposeError(_))));
    }
}
