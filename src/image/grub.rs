// file: src/image/grub.rs
// version: 1.0.0
// guid: a3c5e7f9-1b24-4d86-90c2-f4a6b8d0e951

//! Boot menu patching
//!
//! Enables unattended installation by inserting the autoinstall directive
//! at the kernel command line marker and shortening the menu timeout. The
//! original file is backed up next to the patched one before any mutation.

use super::WorkingTree;
use crate::{IsoBuildError, Result};
use tokio::fs;
use tracing::{debug, info};

/// Marker in the menu grammar where kernel arguments end
const CMDLINE_MARKER: &str = "---";
/// Activation directive pointing the installer at the nocloud datasource
const AUTOINSTALL_DIRECTIVE: &str = "autoinstall ds=nocloud\\;s=/cdrom/nocloud/ ---";

const TIMEOUT_BEFORE: &str = "set timeout=30";
const TIMEOUT_AFTER: &str = "set timeout=5";

/// Patch the boot menu in place, keeping a backup of the original
pub async fn patch(tree: &WorkingTree) -> Result<()> {
    let grub_cfg = tree.grub_cfg();

    if fs::metadata(&grub_cfg).await.is_err() {
        return Err(IsoBuildError::FormatError(format!(
            "GRUB config not found (malformed source image): {}",
            grub_cfg.display()
        )));
    }

    info!("Patching boot menu for unattended install");

    let original = fs::read_to_string(&grub_cfg).await?;

    // Backup before mutating
    let backup = grub_cfg.with_extension("cfg.backup");
    fs::write(&backup, &original).await?;

    let patched = original
        .replace(CMDLINE_MARKER, AUTOINSTALL_DIRECTIVE)
        .replace(TIMEOUT_BEFORE, TIMEOUT_AFTER);

    fs::write(&grub_cfg, patched).await?;

    debug!("Boot menu patched, backup at {}", backup.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_GRUB: &str = "set timeout=30\n\
        menuentry \"Try or Install Ubuntu Server\" {\n\
        \tlinux /casper/vmlinuz --- quiet\n\
        \tinitrd /casper/initrd\n\
        }\n";

    async fn tree_with_grub() -> (TempDir, WorkingTree) {
        let temp_dir = TempDir::new().unwrap();
        let tree = WorkingTree::new(temp_dir.path());
        fs::create_dir_all(tree.grub_cfg().parent().unwrap())
            .await
            .unwrap();
        fs::write(tree.grub_cfg(), SAMPLE_GRUB).await.unwrap();
        (temp_dir, tree)
    }

    #[tokio::test]
    async fn test_patch_inserts_directive_and_timeout() {
        let (_guard, tree) = tree_with_grub().await;

        patch(&tree).await.unwrap();

        let patched = fs::read_to_string(tree.grub_cfg()).await.unwrap();
        assert!(patched.contains("autoinstall ds=nocloud\\;s=/cdrom/nocloud/ ---"));
        assert!(patched.contains("set timeout=5"));
        assert!(!patched.contains("set timeout=30"));
    }

    #[tokio::test]
    async fn test_patch_keeps_backup_of_original() {
        let (_guard, tree) = tree_with_grub().await;

        patch(&tree).await.unwrap();

        let backup = fs::read_to_string(tree.grub_cfg().with_extension("cfg.backup"))
            .await
            .unwrap();
        assert_eq!(backup, SAMPLE_GRUB);
    }

    #[tokio::test]
    async fn test_patch_fails_without_grub_cfg() {
        let temp_dir = TempDir::new().unwrap();
        let tree = WorkingTree::new(temp_dir.path());

        let result = patch(&tree).await;

        assert!(matches!(result, Err(IsoBuildError::FormatError(_))));
    }
}
