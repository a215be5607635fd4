// file: src/pipeline/mod.rs
// version: 1.0.0
// guid: d0f2a4b6-8c17-4e29-93b5-c7d9e1f3a524

//! Build pipeline orchestration
//!
//! Runs the image reconstruction steps strictly in sequence, failing fast
//! on the first error with no retry and no rollback. The configuration
//! document is rendered before anything on disk is touched, so a rendering
//! failure can never leave a half-mutated tree behind.

use crate::config::{self, InstallParams};
use crate::image::{boot_records, composer, grub, injector, unpacker, WorkingTree};
use crate::utils::system;
use crate::{IsoBuildError, Result};
use std::path::PathBuf;
use tracing::info;

/// The named steps of one build, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    DependencyCheck,
    Unpack,
    InjectConfig,
    PatchBootMenu,
    ExtractBootRecords,
    ComposeImage,
}

impl BuildStep {
    pub const ALL: [BuildStep; 6] = [
        BuildStep::DependencyCheck,
        BuildStep::Unpack,
        BuildStep::InjectConfig,
        BuildStep::PatchBootMenu,
        BuildStep::ExtractBootRecords,
        BuildStep::ComposeImage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuildStep::DependencyCheck => "dependency-check",
            BuildStep::Unpack => "unpack",
            BuildStep::InjectConfig => "inject-config",
            BuildStep::PatchBootMenu => "patch-boot-menu",
            BuildStep::ExtractBootRecords => "extract-boot-records",
            BuildStep::ComposeImage => "compose-image",
        }
    }
}

/// One image build from a source ISO to an autoinstall-enabled output ISO
pub struct BuildPipeline {
    source_iso: PathBuf,
    output_iso: PathBuf,
    work_dir: PathBuf,
}

impl BuildPipeline {
    pub fn new(
        source_iso: impl Into<PathBuf>,
        output_iso: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_iso: source_iso.into(),
            output_iso: output_iso.into(),
            work_dir: work_dir.into(),
        }
    }

    /// Run every step in order. Returns the path of the composed image.
    pub async fn run(&self, params: &InstallParams) -> Result<PathBuf> {
        params.validate()?;

        // Rendered once, before any step mutates disk state
        let document = config::build_cloud_config(params)?;
        let serialized = config::render(&document)?;

        let tree = WorkingTree::new(self.work_dir.join("tree"));

        self.announce(BuildStep::DependencyCheck);
        check_dependencies().map_err(|e| fail(BuildStep::DependencyCheck, e))?;

        self.announce(BuildStep::Unpack);
        unpacker::unpack(&self.source_iso, &tree)
            .await
            .map_err(|e| fail(BuildStep::Unpack, e))?;

        self.announce(BuildStep::InjectConfig);
        injector::inject(&tree, &serialized, &params.hostname)
            .await
            .map_err(|e| fail(BuildStep::InjectConfig, e))?;

        self.announce(BuildStep::PatchBootMenu);
        grub::patch(&tree)
            .await
            .map_err(|e| fail(BuildStep::PatchBootMenu, e))?;

        self.announce(BuildStep::ExtractBootRecords);
        let records = boot_records::extract(&self.source_iso, &tree, &self.work_dir)
            .await
            .map_err(|e| fail(BuildStep::ExtractBootRecords, e))?;

        self.announce(BuildStep::ComposeImage);
        composer::compose(&tree, &records, &self.output_iso)
            .await
            .map_err(|e| fail(BuildStep::ComposeImage, e))?;

        info!("Build complete: {}", self.output_iso.display());
        Ok(self.output_iso.clone())
    }

    fn announce(&self, step: BuildStep) {
        let position = BuildStep::ALL
            .iter()
            .position(|s| *s == step)
            .unwrap_or_default();
        info!("Step {}/{}: {}", position + 1, BuildStep::ALL.len(), step.name());
    }
}

/// Verify the external tools the pipeline shells out to are installed
fn check_dependencies() -> Result<()> {
    let missing = system::check_prerequisites();
    if missing.is_empty() {
        return Ok(());
    }
    Err(IsoBuildError::environment(format!(
        "Missing required tools: {}",
        missing.join(", ")
    )))
}

fn fail(step: BuildStep, source: IsoBuildError) -> IsoBuildError {
    IsoBuildError::StepFailed {
        step: step.name(),
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoragePolicy;
    use tempfile::TempDir;

    fn params() -> InstallParams {
        InstallParams {
            hostname: "node1".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "hunter2".to_string(),
            ssh_keys: vec![],
            disk_serial: "DISK123".to_string(),
            encryption_passphrase: None,
            storage_policy: StoragePolicy::Simple,
            service_tokens: vec![],
        }
    }

    #[test]
    fn test_step_names_in_order() {
        let names: Vec<&str> = BuildStep::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "dependency-check",
                "unpack",
                "inject-config",
                "patch-boot-menu",
                "extract-boot-records",
                "compose-image",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_fails_fast_without_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.iso");
        let pipeline = BuildPipeline::new(
            temp_dir.path().join("missing.iso"),
            &output,
            temp_dir.path().join("work"),
        );

        let result = pipeline.run(&params()).await;

        assert!(result.is_err());
        // Fail-fast: no partial output artifact
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_run_reports_failing_step() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = BuildPipeline::new(
            temp_dir.path().join("missing.iso"),
            temp_dir.path().join("out.iso"),
            temp_dir.path().join("work"),
        );

        let err = pipeline.run(&params()).await.unwrap_err();

        match err {
            IsoBuildError::StepFailed { step, .. } => {
                // Either the environment is missing tools or the source is
                // missing; both must name the step that failed
                assert!(step == "dependency-check" || step == "unpack");
            }
            other => panic!("expected StepFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_params() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = BuildPipeline::new(
            temp_dir.path().join("missing.iso"),
            temp_dir.path().join("out.iso"),
            temp_dir.path().join("work"),
        );
        let mut bad = params();
        bad.hostname.clear();

        let err = pipeline.run(&bad).await.unwrap_err();

        assert!(matches!(err, IsoBuildError::ValidationError(_)));
    }
}
