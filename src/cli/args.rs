// file: src/cli/args.rs
// version: 1.0.0
// guid: f8b0d2e4-6a19-4c3b-85d7-e9f1a3b5c720

//! Command line argument definitions

use crate::config::{ServiceToken, StoragePolicy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ubuntu-iso-builder")]
#[command(about = "Build unattended Ubuntu Server installation images")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an autoinstall-enabled bootable ISO from a stock server ISO
    BuildIso {
        #[command(flatten)]
        install: InstallArgs,

        #[arg(short, long, help = "Stock Ubuntu Server ISO to rebuild")]
        source_iso: PathBuf,

        #[arg(short, long, help = "Where to write the composed ISO")]
        output: PathBuf,

        #[arg(long, help = "Working directory (a temporary one is used by default)")]
        work_dir: Option<PathBuf>,
    },

    /// Generate the autoinstall configuration document without building an ISO
    GenerateConfig {
        #[command(flatten)]
        install: InstallArgs,

        #[arg(short, long, help = "Write the document here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Check system prerequisites
    CheckPrereqs,
}

/// Installation parameters shared by the build and generate commands
#[derive(Args)]
pub struct InstallArgs {
    #[arg(long, help = "Hostname of the installed machine")]
    pub hostname: String,

    #[arg(long, help = "Admin account username")]
    pub admin_username: String,

    #[arg(long, env = "ISO_BUILDER_ADMIN_PASSWORD", help = "Admin account password")]
    pub admin_password: String,

    #[arg(long = "ssh-key", help = "SSH public key; repeatable, disables password login")]
    pub ssh_keys: Vec<String>,

    #[arg(long, help = "Serial number of the installation target disk")]
    pub disk_serial: String,

    #[arg(long, env = "ISO_BUILDER_LUKS_PASSPHRASE", help = "Enable full-disk encryption with this passphrase")]
    pub encryption_passphrase: Option<String>,

    #[arg(long, default_value = "simple", help = "Storage plan: simple or explicit")]
    pub layout: StoragePolicy,

    #[arg(long = "service-token", value_parser = parse_service_token, help = "NAME=VALUE claim token; repeatable")]
    pub service_tokens: Vec<ServiceToken>,
}

fn parse_service_token(raw: &str) -> Result<ServiceToken, String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => Ok(ServiceToken {
            name: name.to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

impl From<InstallArgs> for crate::config::InstallParams {
    fn from(args: InstallArgs) -> Self {
        Self {
            hostname: args.hostname,
            admin_username: args.admin_username,
            admin_password: args.admin_password,
            ssh_keys: args.ssh_keys,
            disk_serial: args.disk_serial,
            encryption_passphrase: args.encryption_passphrase,
            storage_policy: args.layout,
            service_tokens: args.service_tokens,
        }
    }
}
