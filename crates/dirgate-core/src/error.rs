//! Error types for Dirgate

use crate::types::{AuthRejectReason, PasswordChangeFailure};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Caller bugs
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Transport establishment
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    // Credential outcomes
    #[error("Credentials rejected: {0}")]
    Rejected(AuthRejectReason),

    #[error("Connection is not authenticated: {0}")]
    BindRequired(String),

    // Input errors
    #[error("Password encoding error: {0}")]
    Encoding(String),

    #[error("Invalid input: {0}")]
    Input(String),

    // Lookup errors
    #[error("No directory entry matches {attribute}={value}")]
    NotFound { attribute: String, value: String },

    #[error("{count} directory entries match {attribute}={value}")]
    Ambiguous {
        attribute: String,
        value: String,
        count: usize,
    },

    // Directory refused an operation
    #[error("Password change failed: {0}")]
    PasswordChange(PasswordChangeFailure),

    #[error("Directory error (rc={code}): {message}")]
    Directory { code: u32, message: String },
}

impl Error {
    /// Stable machine-readable code, independent of the display language.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration_error",
            Error::Connection(_) => "connection_error",
            Error::Transport(_) => "transport_error",
            Error::Rejected(reason) => reason.code(),
            Error::BindRequired(_) => "bind_required",
            Error::Encoding(_) => "encoding_error",
            Error::Input(_) => "input_error",
            Error::NotFound { .. } => "not_found",
            Error::Ambiguous { .. } => "ambiguous",
            Error::PasswordChange(failure) => failure.code(),
            Error::Directory { .. } => "directory_error",
        }
    }

    /// Whether retrying on a fresh connection could succeed.
    ///
    /// Credential rejections and caller errors are final; transport
    /// failures are left to the caller's retry policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_classification() {
        assert_eq!(
            Error::Rejected(AuthRejectReason::AccountLocked).code(),
            "account_locked"
        );
        assert_eq!(
            Error::PasswordChange(PasswordChangeFailure::PolicyViolation).code(),
            "policy_violation"
        );
        assert_eq!(Error::Configuration("x".into()).code(), "configuration_error");
    }

    #[test]
    fn test_transient_errors() {
        assert!(Error::Transport("reset by peer".into()).is_transient());
        assert!(Error::Connection("refused".into()).is_transient());
        assert!(!Error::Rejected(AuthRejectReason::InvalidCredentials).is_transient());
        assert!(!Error::Encoding("nul".into()).is_transient());
        assert!(!Error::Input("no password".into()).is_transient());
    }
}
