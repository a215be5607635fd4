// file: src/cli/commands.rs
// version: 1.0.0
// guid: a9c1e3f5-7b28-4d0a-96b2-d4e6f8a0c317

//! Command implementations

use crate::config::{self, InstallParams};
use crate::pipeline::BuildPipeline;
use crate::utils::system;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Build an autoinstall-enabled ISO from a stock server ISO
pub async fn build_iso_command(
    params: InstallParams,
    source_iso: &Path,
    output: &Path,
    work_dir: Option<PathBuf>,
) -> Result<()> {
    // The guard keeps a generated temporary directory alive for the whole run
    let (work_dir, _guard) = match work_dir {
        Some(dir) => (dir, None),
        None => {
            let temp = tempfile::tempdir()?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };

    let pipeline = BuildPipeline::new(source_iso, output, work_dir);
    let image = pipeline.run(&params).await?;

    println!("Created: {}", image.display());
    Ok(())
}

/// Generate the autoinstall configuration document without touching an image
pub async fn generate_config_command(
    params: InstallParams,
    output: Option<PathBuf>,
) -> Result<()> {
    params.validate()?;

    let document = config::build_cloud_config(&params)?;
    let serialized = config::render(&document)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &serialized).await?;
            info!("Configuration written to {}", path.display());
        }
        None => print!("{}", serialized),
    }
    Ok(())
}

/// Report which required external tools are installed
pub async fn check_prerequisites_command() -> Result<()> {
    let missing = system::check_prerequisites();

    for tool in system::REQUIRED_TOOLS {
        let status = if missing.contains(&tool.to_string()) {
            "MISSING"
        } else {
            "ok"
        };
        println!("{:<12} {}", tool, status);
    }

    if missing.is_empty() {
        println!("All prerequisites satisfied");
        Ok(())
    } else {
        Err(crate::IsoBuildError::environment(format!(
            "Missing required tools: {}",
            missing.join(", ")
        )))
    }
}
