//! Directory connection settings

use crate::types::PrincipalName;
use crate::utils::{base_dn_from_domain, domain_from_base_dn};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Transport security used when connecting to the directory
///
/// The `Insecure*` modes skip certificate-chain and hostname validation.
/// They exist for legacy directories and are never the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// Plaintext LDAP
    None,
    /// LDAPS, TLS from the first byte
    #[default]
    Tls,
    /// Plaintext upgraded with the StartTLS extended operation
    StartTls,
    InsecureTls,
    InsecureStartTls,
}

impl SecurityMode {
    pub const ALL: [SecurityMode; 5] = [
        SecurityMode::None,
        SecurityMode::Tls,
        SecurityMode::StartTls,
        SecurityMode::InsecureTls,
        SecurityMode::InsecureStartTls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityMode::None => "none",
            SecurityMode::Tls => "tls",
            SecurityMode::StartTls => "start_tls",
            SecurityMode::InsecureTls => "insecure_tls",
            SecurityMode::InsecureStartTls => "insecure_start_tls",
        }
    }

    /// Port used when the configuration does not name one
    pub fn default_port(&self) -> u16 {
        match self {
            SecurityMode::Tls | SecurityMode::InsecureTls => crate::DEFAULT_LDAPS_PORT,
            _ => crate::DEFAULT_LDAP_PORT,
        }
    }

    pub fn uses_tls(&self) -> bool {
        !matches!(self, SecurityMode::None)
    }

    pub fn verifies_certificates(&self) -> bool {
        matches!(self, SecurityMode::Tls | SecurityMode::StartTls)
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "none" | "plain" => Ok(SecurityMode::None),
            "tls" | "ldaps" => Ok(SecurityMode::Tls),
            "start_tls" | "starttls" => Ok(SecurityMode::StartTls),
            "insecure_tls" => Ok(SecurityMode::InsecureTls),
            "insecure_start_tls" | "insecure_starttls" => Ok(SecurityMode::InsecureStartTls),
            _ => Err(Error::Configuration(format!(
                "invalid security mode: {:?}",
                s
            ))),
        }
    }
}

/// Certificate authorities trusted for TLS, as DER blobs
#[derive(Clone, PartialEq, Eq)]
pub struct TrustRoots {
    certificates: Vec<Vec<u8>>,
}

impl TrustRoots {
    pub fn from_der(certificates: Vec<Vec<u8>>) -> Result<Self> {
        if certificates.is_empty() {
            return Err(Error::Configuration(
                "trust roots must contain at least one certificate".into(),
            ));
        }
        Ok(Self { certificates })
    }

    /// Parse every certificate in a PEM bundle
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let mut reader = BufReader::new(pem);
        let certs = rustls_pemfile::certs(&mut reader).map_err(|e| {
            Error::Configuration(format!("Failed to parse CA certificates: {}", e))
        })?;
        Self::from_der(certs)
    }

    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let pem = std::fs::read(path).map_err(|e| {
            Error::Configuration(format!("Failed to open CA file {:?}: {}", path, e))
        })?;
        Self::from_pem(&pem).map_err(|e| {
            Error::Configuration(format!("No usable certificates in {:?}: {}", path, e))
        })
    }

    pub fn certificates(&self) -> &[Vec<u8>] {
        &self.certificates
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl fmt::Debug for TrustRoots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustRoots")
            .field("certificates", &self.certificates.len())
            .finish()
    }
}

/// Everything needed to reach one directory server
///
/// Built once (usually from [`crate::config::DirectorySection`]) and then
/// shared read-only by every connection it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub server: String,
    pub port: u16,
    pub security: SecurityMode,
    pub trust_roots: Option<TrustRoots>,
    /// Search base for DN resolution
    pub base_dn: Option<String>,
    /// UPN suffix appended to bare usernames
    pub domain: Option<String>,
    pub timeout: Duration,
}

impl DirectoryConfig {
    /// Config for `server` on the default port of `security`
    pub fn new(server: impl Into<String>, security: SecurityMode) -> Self {
        Self {
            server: server.into(),
            port: security.default_port(),
            security,
            trust_roots: None,
            base_dn: None,
            domain: None,
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_trust_roots(mut self, roots: TrustRoots) -> Self {
        self.trust_roots = Some(roots);
        self
    }

    pub fn with_base_dn(mut self, base_dn: impl Into<String>) -> Self {
        self.base_dn = Some(base_dn.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(Error::Configuration("server must not be empty".into()));
        }
        if self.server.contains(['/', ' ']) {
            return Err(Error::Configuration(format!(
                "server must be a host name, got {:?}",
                self.server
            )));
        }
        if self.port == 0 {
            return Err(Error::Configuration("port must not be 0".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration("timeout must not be 0".into()));
        }
        Ok(())
    }

    /// `host:port`, bracketing IPv6 literals
    pub fn address(&self) -> String {
        if self.server.contains(':') && !self.server.starts_with('[') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }

    /// Bind identity for `username`
    ///
    /// A name that already has a domain part is used as is. Otherwise the
    /// configured domain is appended, or one derived from the `DC=`
    /// components of the base DN.
    pub fn upn(&self, username: &str) -> Result<PrincipalName> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::Configuration("username must not be empty".into()));
        }

        if let Some((local, domain)) = username.rsplit_once('@') {
            if !local.is_empty() && !domain.is_empty() {
                return Ok(PrincipalName::new(username));
            }
            return Err(Error::Configuration(format!(
                "malformed principal name: {:?}",
                username
            )));
        }

        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            return Ok(PrincipalName::new(format!("{}@{}", username, domain)));
        }

        if let Some(base_dn) = &self.base_dn {
            return match domain_from_base_dn(base_dn) {
                Some(domain) => Ok(PrincipalName::new(format!("{}@{}", username, domain))),
                None => Err(Error::Configuration(format!(
                    "base DN {:?} has no DC components",
                    base_dn
                ))),
            };
        }

        Err(Error::Configuration(
            "domain or base_dn required to build a user principal name".into(),
        ))
    }

    /// Base for searches: the configured base DN, else one built from the domain
    pub fn search_base(&self) -> Result<String> {
        if let Some(base_dn) = self.base_dn.as_deref().filter(|b| !b.is_empty()) {
            return Ok(base_dn.to_string());
        }
        self.domain
            .as_deref()
            .and_then(base_dn_from_domain)
            .ok_or_else(|| Error::Configuration("base_dn or domain required for searches".into()))
    }
}
