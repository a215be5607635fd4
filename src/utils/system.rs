// file: src/utils/system.rs
// version: 1.0.0
// guid: a9c2e4f6-1d38-4b70-95a2-c7e0d3b8f165

//! System utility functions

use tracing::debug;

/// External tools the image pipeline shells out to
pub const REQUIRED_TOOLS: &[&str] = &["xorriso", "7z"];

/// Check if a command exists in PATH
pub fn command_exists(command: &str) -> bool {
    which::which(command).is_ok()
}

/// Check pipeline prerequisites and return the missing tool names
pub fn check_prerequisites() -> Vec<String> {
    let mut missing = Vec::new();

    for tool in REQUIRED_TOOLS {
        if command_exists(tool) {
            debug!("Found required tool: {}", tool);
        } else {
            missing.push(tool.to_string());
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("ls"));
        assert!(!command_exists("nonexistent-command-12345"));
    }

    #[test]
    fn test_check_prerequisites_reports_only_required_tools() {
        let missing = check_prerequisites();
        for tool in &missing {
            assert!(REQUIRED_TOOLS.contains(&tool.as_str()));
        }
    }
}
