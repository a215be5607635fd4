// file: src/config/serializer.rs
// version: 1.0.0
// guid: d8f1b3c5-9e27-4a60-b194-6c0d82e5a7f9

//! Canonical autoinstall document rendering
//!
//! The same rendered text is written to two locations in the image, and the
//! installer may honor either one, so rendering must be a pure function of
//! the document: stable key order (declaration order of the wire structs),
//! literal block style for multi-line scalars, exactly one trailing newline.

use super::autoinstall::CloudConfig;
use crate::Result;

/// Fixed first line the installer looks for
pub const CLOUD_CONFIG_HEADER: &str = "#cloud-config";

/// Render the document to its canonical text form
pub fn render(config: &CloudConfig) -> Result<String> {
    let body = serde_yaml::to_string(config)?;

    let mut rendered = format!("{}\n{}", CLOUD_CONFIG_HEADER, body);
    while rendered.ends_with("\n\n") {
        rendered.pop();
    }
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    Ok(rendered)
}
