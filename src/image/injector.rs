// file: src/image/injector.rs
// version: 1.0.0
// guid: f2b4d6e8-0a13-4c75-b9d1-e3f5a7c9b840

//! Autoinstall configuration injection
//!
//! The installer may discover its configuration either from the root-level
//! file or from the nocloud datasource directory, depending on the boot
//! path. Both copies are written from the same serialized text so the build
//! works whichever one the installer honors.

use super::WorkingTree;
use crate::Result;
use tokio::fs;
use tracing::{debug, info};

/// Empty vendor-data stub required by the nocloud datasource
const VENDOR_DATA: &str = "#cloud-config\n{}\n";

/// Write the serialized configuration into both discovery locations, plus
/// the instance-identity and vendor stub files the datasource expects
pub async fn inject(tree: &WorkingTree, serialized: &str, hostname: &str) -> Result<()> {
    info!("Injecting autoinstall configuration");

    // Root-level file, read by the installer directly
    fs::write(tree.autoinstall_file(), serialized).await?;

    // nocloud datasource: byte-identical config plus metadata
    let nocloud = tree.nocloud_dir();
    fs::create_dir_all(&nocloud).await?;
    fs::write(nocloud.join("user-data"), serialized).await?;
    fs::write(nocloud.join("meta-data"), meta_data(hostname)).await?;
    fs::write(nocloud.join("vendor-data"), VENDOR_DATA).await?;

    debug!(
        "Configuration written to {} and {}",
        tree.autoinstall_file().display(),
        nocloud.display()
    );
    Ok(())
}

fn meta_data(hostname: &str) -> String {
    format!("instance-id: iid-{}\nlocal-hostname: {}\n", hostname, hostname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_inject_writes_identical_copies() {
        let temp_dir = TempDir::new().unwrap();
        let tree = WorkingTree::new(temp_dir.path());
        let serialized = "#cloud-config\nautoinstall:\n  version: 1\n";

        inject(&tree, serialized, "node1").await.unwrap();

        let root_copy = fs::read(tree.autoinstall_file()).await.unwrap();
        let nocloud_copy = fs::read(tree.nocloud_dir().join("user-data"))
            .await
            .unwrap();

        assert_eq!(root_copy, nocloud_copy);
        assert_eq!(root_copy, serialized.as_bytes());
    }

    #[tokio::test]
    async fn test_inject_writes_datasource_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let tree = WorkingTree::new(temp_dir.path());

        inject(&tree, "#cloud-config\n", "node1").await.unwrap();

        let meta = fs::read_to_string(tree.nocloud_dir().join("meta-data"))
            .await
            .unwrap();
        assert_eq!(meta, "instance-id: iid-node1\nlocal-hostname: node1\n");

        let vendor = fs::read_to_string(tree.nocloud_dir().join("vendor-data"))
            .await
            .unwrap();
        assert_eq!(vendor, "#cloud-config\n{}\n");
    }
}
