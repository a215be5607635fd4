// file: src/error.rs
// version: 1.0.0
// guid: 9b0e5d7c-2a41-4f38-8c6d-e35a917f204b

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, IsoBuildError>;

/// Error types for the Ubuntu ISO builder
#[derive(Error, Debug)]
pub enum IsoBuildError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment error: {0}")]
    EnvironmentError(String),

    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Process '{command}' failed with exit code {exit_code:?}: {stderr}")]
    ProcessError {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Image composition failed: {0}")]
    ComposeError(String),

    #[error("Password hashing failed: {0}")]
    HashError(String),

    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: &'static str,
        #[source]
        source: Box<IsoBuildError>,
    },
}

impl IsoBuildError {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a new environment error
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::EnvironmentError(msg.into())
    }

    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::FormatError(msg.into())
    }
}
