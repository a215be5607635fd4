// file: src/lib.rs
// version: 1.0.0
// guid: 3f8c2a19-6b4d-4e07-9a52-c1d8e0f47b63

//! # Ubuntu ISO Builder
//!
//! Turns a set of installation parameters (hostname, admin credentials, SSH
//! keys, disk selection, optional full-disk-encryption passphrase) into a
//! bootable, fully unattended Ubuntu Server installation image.
//!
//! The work happens in two halves: deterministic generation of the
//! autoinstall cloud-config document, and binary-level reconstruction of a
//! hybrid BIOS/UEFI ISO that embeds that document.

pub mod cli;
pub mod config;
pub mod error;
pub mod image;
pub mod logging;
pub mod pipeline;
pub mod utils;

pub use error::{IsoBuildError, Result};

/// Version information for the builder
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
