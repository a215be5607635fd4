// file: src/config/mod.rs
// version: 1.0.0
// guid: a1b2c3d4-e5f6-4a8b-9c0d-1e2f3a4b5c6d

//! Configuration module for the Ubuntu ISO builder
//!
//! Holds the validated installation parameters, the autoinstall document
//! wire types, the document builder and the canonical serializer.

pub mod autoinstall;
pub mod document;
pub mod serializer;

pub use autoinstall::{Autoinstall, CloudConfig, Storage, StorageOp};
pub use document::build_cloud_config;
pub use serializer::render;

/// Which storage plan the generated document carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoragePolicy {
    /// Named LVM layout matched against a disk serial substring
    #[default]
    Simple,
    /// Fully ordered sequence of storage-operation records
    Explicit,
}

impl std::str::FromStr for StoragePolicy {
    type Err = crate::error::IsoBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(StoragePolicy::Simple),
            "explicit" => Ok(StoragePolicy::Explicit),
            _ => Err(crate::error::IsoBuildError::ValidationError(format!(
                "Unknown storage policy: {}",
                s
            ))),
        }
    }
}

/// A named claim token for a third-party service, written into the installed
/// system by a late command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceToken {
    pub name: String,
    pub value: String,
}

/// Validated installation parameters for one image build
#[derive(Debug, Clone)]
pub struct InstallParams {
    /// Hostname the installed machine will have
    pub hostname: String,
    /// Admin user created by the installer
    pub admin_username: String,
    /// Plaintext admin password, consumed exactly once by hashing
    pub admin_password: String,
    /// SSH public keys; any key switches the ssh block to keys-only
    pub ssh_keys: Vec<String>,
    /// Serial number (or substring, for the simple layout) of the target disk
    pub disk_serial: String,
    /// Optional LUKS passphrase for full-disk encryption
    pub encryption_passphrase: Option<String>,
    /// Storage plan shape
    pub storage_policy: StoragePolicy,
    /// Claim tokens for third-party services, in write order
    pub service_tokens: Vec<ServiceToken>,
}

impl InstallParams {
    /// Validate the parameters before they enter the build pipeline
    pub fn validate(&self) -> crate::Result<()> {
        if self.hostname.is_empty() {
            return Err(crate::error::IsoBuildError::ValidationError(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.admin_username.is_empty() {
            return Err(crate::error::IsoBuildError::ValidationError(
                "Admin username cannot be empty".to_string(),
            ));
        }

        if self.disk_serial.is_empty() {
            return Err(crate::error::IsoBuildError::ValidationError(
                "Disk serial cannot be empty".to_string(),
            ));
        }

        if self
            .encryption_passphrase
            .as_deref()
            .is_some_and(str::is_empty)
        {
            return Err(crate::error::IsoBuildError::ValidationError(
                "Encryption passphrase cannot be empty when supplied".to_string(),
            ));
        }

        for token in &self.service_tokens {
            if token.name.is_empty() || token.value.is_empty() {
                return Err(crate::error::IsoBuildError::ValidationError(
                    "Service tokens require both a name and a value".to_string(),
                ));
            }
        }

        Ok(())
    }
}
