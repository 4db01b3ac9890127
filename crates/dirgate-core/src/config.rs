//! Configuration for Dirgate
//!
//! Example config:
//! ```toml
//! [directory]
//! server = "dc1.corp.example.com"
//! security = "start_tls"
//! ca_file = "/etc/dirgate/corp-ca.pem"
//! base_dn = "DC=corp,DC=example,DC=com"
//! domain = "corp.example.com"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use crate::types::{DirectoryConfig, SecurityMode, TrustRoots};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirgateConfig {
    #[serde(default)]
    pub directory: DirectorySection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DirgateConfig {
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Configuration(format!("Failed to read config {:?}: {}", path, e))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `DIRGATE_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(server) = std::env::var("DIRGATE_SERVER") {
            self.directory.server = server;
        }
        if let Ok(port) = std::env::var("DIRGATE_PORT") {
            if let Ok(p) = port.parse() {
                self.directory.port = Some(p);
            }
        }
        if let Ok(security) = std::env::var("DIRGATE_SECURITY") {
            self.directory.security = security;
        }
        if let Ok(ca) = std::env::var("DIRGATE_CA_FILE") {
            self.directory.ca_file = Some(PathBuf::from(ca));
        }
        if let Ok(base_dn) = std::env::var("DIRGATE_BASE_DN") {
            self.directory.base_dn = Some(base_dn);
        }
        if let Ok(domain) = std::env::var("DIRGATE_DOMAIN") {
            self.directory.domain = Some(domain);
        }
        if let Ok(timeout) = std::env::var("DIRGATE_TIMEOUT_SECONDS") {
            if let Ok(t) = timeout.parse() {
                self.directory.timeout_seconds = t;
            }
        }
        if let Ok(level) = std::env::var("DIRGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DIRGATE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Directory server section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySection {
    /// Directory host name
    #[serde(default)]
    pub server: String,

    /// Port; defaults to 636 for TLS modes and 389 otherwise
    #[serde(default)]
    pub port: Option<u16>,

    /// none, tls, start_tls, insecure_tls, insecure_start_tls
    #[serde(default = "default_security")]
    pub security: String,

    /// PEM bundle of trusted CAs; system roots when unset
    #[serde(default)]
    pub ca_file: Option<PathBuf>,

    /// Search base for DN resolution
    #[serde(default)]
    pub base_dn: Option<String>,

    /// UPN suffix for bare usernames
    #[serde(default)]
    pub domain: Option<String>,

    /// Connect and per-operation timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_security() -> String {
    SecurityMode::default().as_str().to_string()
}

fn default_timeout() -> u64 {
    crate::DEFAULT_TIMEOUT_SECS
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: None,
            security: default_security(),
            ca_file: None,
            base_dn: None,
            domain: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl DirectorySection {
    pub fn security_mode(&self) -> crate::Result<SecurityMode> {
        self.security.parse()
    }

    /// Build the immutable connection settings, loading trust roots
    pub fn to_directory_config(&self) -> crate::Result<DirectoryConfig> {
        let security = self.security_mode()?;

        let mut config = DirectoryConfig::new(self.server.trim(), security)
            .with_timeout(Duration::from_secs(self.timeout_seconds));

        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(base_dn) = self.base_dn.as_deref().filter(|b| !b.is_empty()) {
            config = config.with_base_dn(base_dn);
        }
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            config = config.with_domain(domain);
        }

        if let Some(ref ca_file) = self.ca_file {
            if security.verifies_certificates() {
                config = config.with_trust_roots(TrustRoots::from_pem_file(ca_file)?);
            } else {
                tracing::warn!(
                    ca_file = ?ca_file,
                    security = %security,
                    "CA file ignored: security mode does not verify certificates"
                );
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// pretty or json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
