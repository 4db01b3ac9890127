//! Dirgate Core Library
//!
//! Core types, configuration and errors shared by the directory
//! authentication client and its command-line front end.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::DirgateConfig;
pub use error::{Error, Result};

/// Dirgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port for plaintext and StartTLS connections
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Default port for implicit TLS connections
pub const DEFAULT_LDAPS_PORT: u16 = 636;

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Attribute holding the account password on Active Directory
pub const PASSWORD_ATTRIBUTE: &str = "unicodePwd";

/// Attribute holding the user principal name
pub const UPN_ATTRIBUTE: &str = "userPrincipalName";

/// LDAP result code for invalidCredentials
pub const RESULT_INVALID_CREDENTIALS: u32 = 49;

/// LDAP result code for sizeLimitExceeded
pub const RESULT_SIZE_LIMIT_EXCEEDED: u32 = 4;
