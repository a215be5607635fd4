// file: src/image/boot_records.rs
// version: 1.0.0
// guid: b8d0f2a4-6c35-4e97-81b3-a5c7d9e1f062

//! Hybrid boot record extraction
//!
//! A hybrid BIOS/UEFI image carries two boot records whose bytes must be
//! lifted verbatim from the source image: the leading Master Boot Record
//! sector for legacy BIOS, and the UEFI boot image whose location is only
//! discoverable from the El Torito boot catalog report.

use super::WorkingTree;
use crate::{IsoBuildError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Bytes of the MBR preceding the partition table
pub const MBR_LEN: usize = 446;
/// Optical image sector size
pub const SECTOR_SIZE: u64 = 2048;
/// Block unit used by the El Torito report's size field
const REPORT_BLOCK_SIZE: u64 = 512;

/// Location of the UEFI boot image inside the source, as reported by the
/// boot catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EfiBootImage {
    /// Start block in 2048-byte sectors
    pub start_block: u64,
    /// Block size announced by the report line
    pub block_size: u64,
    /// Image size in 512-byte report blocks
    pub block_count: u64,
}

impl EfiBootImage {
    /// Image size converted to true 2048-byte sectors
    pub fn sector_count(&self) -> u64 {
        self.block_count / (SECTOR_SIZE / REPORT_BLOCK_SIZE)
    }

    pub fn byte_offset(&self) -> u64 {
        self.start_block * SECTOR_SIZE
    }

    pub fn byte_len(&self) -> u64 {
        self.sector_count() * SECTOR_SIZE
    }
}

/// Boot records lifted from the source image, consumed by the composer
#[derive(Debug, Clone)]
pub struct BootRecordSet {
    /// MBR file, absent when the leading sector could not be read
    pub mbr: Option<PathBuf>,
    /// Extracted UEFI boot image inside the working tree
    pub efi_image: PathBuf,
}

/// Find the UEFI boot image location in an El Torito boot catalog report.
///
/// Pure text-in, location-out parsing so it can be tested against captured
/// report output without invoking any external tool.
pub fn parse_el_torito_report(report: &str) -> Option<EfiBootImage> {
    // e.g. "libisofs: NOTE : EFI image start and size: 1610304 * 2048 , 10160 * 512"
    let pattern = Regex::new(r"EFI image start and size:\s*(\d+)\s*\*\s*(\d+)\s*,\s*(\d+)")
        .expect("static regex");

    for line in report.lines() {
        if let Some(captures) = pattern.captures(line) {
            return Some(EfiBootImage {
                start_block: captures[1].parse().ok()?,
                block_size: captures[2].parse().ok()?,
                block_count: captures[3].parse().ok()?,
            });
        }
    }

    None
}

/// Extract the boot records from the untouched source image.
///
/// MBR extraction failure degrades gracefully (the image stays UEFI-only
/// bootable); a missing or unparsable EFI record is fatal because no hybrid
/// image can be produced without it.
pub async fn extract(
    source_iso: &Path,
    tree: &WorkingTree,
    work_dir: &Path,
) -> Result<BootRecordSet> {
    info!("Extracting hybrid boot records from source image");

    let mbr = match extract_mbr(source_iso, work_dir).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Could not extract MBR, legacy BIOS boot degraded: {}", e);
            None
        }
    };

    let report = report_el_torito(source_iso).await?;
    let efi = parse_el_torito_report(&report).ok_or_else(|| {
        IsoBuildError::FormatError(
            "El Torito report does not announce an EFI boot image".to_string(),
        )
    })?;

    debug!(
        "EFI boot image at block {} ({} sectors)",
        efi.start_block,
        efi.sector_count()
    );

    let efi_path = tree.efi_image();
    if let Some(parent) = efi_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    copy_range(source_iso, &efi_path, efi.byte_offset(), efi.byte_len()).await?;

    info!(
        "EFI boot image extracted ({} KB)",
        efi.byte_len() / 1024
    );

    Ok(BootRecordSet {
        mbr,
        efi_image: efi_path,
    })
}

/// Copy the first 446 bytes of the source image verbatim
async fn extract_mbr(source_iso: &Path, work_dir: &Path) -> Result<PathBuf> {
    let mut source = fs::File::open(source_iso).await?;
    let mut mbr = [0u8; MBR_LEN];
    source.read_exact(&mut mbr).await?;

    let mbr_path = work_dir.join("isohdpfx.bin");
    fs::write(&mbr_path, &mbr).await?;
    Ok(mbr_path)
}

/// Obtain the textual boot catalog report for the source image
async fn report_el_torito(source_iso: &Path) -> Result<String> {
    let output = Command::new("xorriso")
        .arg("-indev")
        .arg(source_iso)
        .arg("-report_el_torito")
        .arg("plain")
        .output()
        .await?;

    if !output.status.success() {
        return Err(IsoBuildError::ProcessError {
            command: format!("xorriso -indev {} -report_el_torito plain", source_iso.display()),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    // The announcing NOTE arrives on stderr, the catalog itself on stdout
    let mut report = String::from_utf8_lossy(&output.stdout).to_string();
    report.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(report)
}

/// Copy an exact byte range out of the source image
async fn copy_range(source_iso: &Path, dest: &Path, offset: u64, len: u64) -> Result<()> {
    let mut source = fs::File::open(source_iso).await?;
    source.seek(SeekFrom::Start(offset)).await?;

    let mut dest_file = fs::File::create(dest).await?;
    let mut remaining = len;
    let mut buf = vec![0u8; (64 * SECTOR_SIZE) as usize];

    while remaining > 0 {
        let chunk = remaining.min(buf.len() as u64) as usize;
        source.read_exact(&mut buf[..chunk]).await?;
        dest_file.write_all(&buf[..chunk]).await?;
        remaining -= chunk as u64;
    }

    dest_file.flush().await?;
    Ok(())
}
