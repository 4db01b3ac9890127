//! Directory protocol capability
//!
//! The flows in this crate never talk to `ldap3` directly. They go through
//! [`DirectoryDialer`] and [`DirectoryTransport`], which the `ldap3` backend
//! implements for real servers and the in-memory fake implements for tests.

use async_trait::async_trait;
use dirgate_core::types::{DirectoryConfig, SecurityMode, TrustRoots};
use dirgate_core::Error;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a transport operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The directory answered with a non-success result code
    #[error("rc={code}: {message}")]
    Result { code: u32, message: String },

    /// No answer: dial, TLS, I/O or timeout failure
    #[error("{0}")]
    Transport(String),
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Result { code, message } => Error::Directory { code, message },
            ProtocolError::Transport(cause) => Error::Transport(cause),
        }
    }
}

/// One attribute change inside a modify request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeChange {
    Add { attribute: String, values: Vec<Vec<u8>> },
    Delete { attribute: String, values: Vec<Vec<u8>> },
    Replace { attribute: String, values: Vec<Vec<u8>> },
}

impl AttributeChange {
    pub fn add(attribute: &str, value: Vec<u8>) -> Self {
        Self::Add {
            attribute: attribute.to_string(),
            values: vec![value],
        }
    }

    pub fn delete(attribute: &str, value: Vec<u8>) -> Self {
        Self::Delete {
            attribute: attribute.to_string(),
            values: vec![value],
        }
    }

    pub fn replace(attribute: &str, value: Vec<u8>) -> Self {
        Self::Replace {
            attribute: attribute.to_string(),
            values: vec![value],
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            Self::Add { attribute, .. }
            | Self::Delete { attribute, .. }
            | Self::Replace { attribute, .. } => attribute,
        }
    }
}

/// How the channel gets encrypted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsNegotiation {
    Plaintext,
    /// TLS from the first byte (`ldaps://`)
    Implicit,
    /// Plaintext, then the StartTLS extended operation
    StartTls,
}

/// How the server certificate is checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificatePolicy {
    /// No TLS, nothing to check
    NotApplicable,
    /// Chain and host name validated; `None` means system roots
    Verify { trust_roots: Option<TrustRoots> },
    /// Chain and host name ignored
    Skip,
}

/// Everything a dialer needs, derived from a [`DirectoryConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialPlan {
    pub url: String,
    /// Name the certificate must match
    pub server_name: String,
    pub negotiation: TlsNegotiation,
    pub certificates: CertificatePolicy,
    pub timeout: Duration,
}

impl DialPlan {
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let (scheme, negotiation) = match config.security {
            SecurityMode::None => ("ldap", TlsNegotiation::Plaintext),
            SecurityMode::Tls | SecurityMode::InsecureTls => ("ldaps", TlsNegotiation::Implicit),
            SecurityMode::StartTls | SecurityMode::InsecureStartTls => {
                ("ldap", TlsNegotiation::StartTls)
            }
        };

        let certificates = match config.security {
            SecurityMode::None => CertificatePolicy::NotApplicable,
            SecurityMode::Tls | SecurityMode::StartTls => CertificatePolicy::Verify {
                trust_roots: config.trust_roots.clone(),
            },
            SecurityMode::InsecureTls | SecurityMode::InsecureStartTls => CertificatePolicy::Skip,
        };

        Self {
            url: format!("{}://{}", scheme, config.address()),
            server_name: config.server.clone(),
            negotiation,
            certificates,
            timeout: config.timeout,
        }
    }

    pub fn verifies_certificates(&self) -> bool {
        matches!(self.certificates, CertificatePolicy::Verify { .. })
    }
}

/// A live session with the directory
#[async_trait]
pub trait DirectoryTransport: Send {
    /// Simple bind
    async fn bind(&mut self, principal: &str, secret: &str) -> Result<(), ProtocolError>;

    /// Apply all changes to `dn` as one atomic modify request
    async fn modify(&mut self, dn: &str, changes: Vec<AttributeChange>)
        -> Result<(), ProtocolError>;

    /// Subtree search returning the DNs of at most `size_limit` entries
    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        size_limit: usize,
    ) -> Result<Vec<String>, ProtocolError>;

    /// Unbind and release the session
    async fn close(&mut self) -> Result<(), ProtocolError>;
}

/// Opens transports
#[async_trait]
pub trait DirectoryDialer: Send + Sync {
    async fn dial(&self, plan: &DialPlan) -> Result<Box<dyn DirectoryTransport>, ProtocolError>;
}
