//! Configuration loading for the Dirgate CLI
//!
//! Config file location: `--config`, else ~/.dirgate/config.toml when it
//! exists, else built-in defaults. `DIRGATE_*` environment variables
//! override the file and command line flags override both.

use anyhow::{Context, Result};
use clap::Args;
use dirgate_core::DirgateConfig;
use std::path::{Path, PathBuf};

/// Directory settings that can be given on the command line
#[derive(Debug, Clone, Default, Args)]
pub struct DirectoryArgs {
    /// Directory server host name
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Directory server port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// none, tls, start_tls, insecure_tls or insecure_start_tls
    #[arg(long, global = true)]
    pub security: Option<String>,

    /// PEM file with the CA certificates to trust
    #[arg(long, global = true)]
    pub ca_file: Option<PathBuf>,

    /// Search base for DN lookups
    #[arg(long, global = true)]
    pub base_dn: Option<String>,

    /// Domain appended to bare usernames
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// Network timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl DirectoryArgs {
    pub fn apply(&self, config: &mut DirgateConfig) {
        let directory = &mut config.directory;

        if let Some(server) = &self.server {
            directory.server = server.clone();
        }
        if let Some(port) = self.port {
            directory.port = Some(port);
        }
        if let Some(security) = &self.security {
            directory.security = security.clone();
        }
        if let Some(ca_file) = &self.ca_file {
            directory.ca_file = Some(ca_file.clone());
        }
        if let Some(base_dn) = &self.base_dn {
            directory.base_dn = Some(base_dn.clone());
        }
        if let Some(domain) = &self.domain {
            directory.domain = Some(domain.clone());
        }
        if let Some(timeout) = self.timeout {
            directory.timeout_seconds = timeout;
        }
    }
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .context("Could not determine home directory")?
        .home_dir()
        .to_path_buf();

    Ok(home.join(".dirgate").join("config.toml"))
}

/// Load configuration from file, environment and flags
pub fn load(explicit: Option<&Path>, args: &DirectoryArgs) -> Result<DirgateConfig> {
    let mut config = match explicit {
        Some(path) => DirgateConfig::from_file(path)?,
        None => match config_path() {
            Ok(path) if path.exists() => DirgateConfig::from_file(&path)?,
            _ => DirgateConfig::default(),
        },
    };

    config.apply_env();
    args.apply(&mut config);
    Ok(config)
}
