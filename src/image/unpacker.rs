// file: src/image/unpacker.rs
// version: 1.0.0
// guid: e6a8c0d2-4f61-4b93-a7b5-d9e1f3a5c728

//! Source image extraction

use super::WorkingTree;
use crate::{IsoBuildError, Result};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

/// Extract every file from the source image into the working tree.
///
/// The tree directory is recreated from scratch; a previous run's contents
/// never leak into this one. Failure leaves whatever was extracted in place
/// for inspection — there is no partial cleanup guarantee.
pub async fn unpack(source_iso: &Path, tree: &WorkingTree) -> Result<()> {
    if fs::metadata(source_iso).await.is_err() {
        return Err(IsoBuildError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Source image not found: {}", source_iso.display()),
        )));
    }

    if fs::metadata(tree.root()).await.is_ok() {
        fs::remove_dir_all(tree.root()).await?;
    }
    fs::create_dir_all(tree.root()).await?;

    info!("Extracting {} into working tree", source_iso.display());

    let dest_flag = format!("-o{}", tree.root().display());
    let output = Command::new("7z")
        .arg("x")
        .arg(source_iso)
        .arg(&dest_flag)
        .arg("-y")
        .output()
        .await?;

    if !output.status.success() {
        return Err(IsoBuildError::ProcessError {
            command: format!("7z x {}", source_iso.display()),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    debug!("Extraction complete: {}", tree.root().display());
    Ok(())
}
