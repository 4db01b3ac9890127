//! Bind and password-change outcome types
//!
//! Classification only: each variant carries a stable `code()` for callers
//! that localize, and an English `Display` for everyone else. Directory
//! text that matches no known code is kept verbatim.

use serde::Serialize;
use std::fmt;

/// Active Directory diagnostic sub-codes reported with invalidCredentials
pub const BIND_SUB_CODES: [&str; 6] = ["52e", "773", "775", "532", "533", "701"];

/// Reason a directory refused a principal's credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum AuthRejectReason {
    InvalidCredentials,
    MustChangePassword,
    AccountLocked,
    PasswordExpired,
    AccountDisabled,
    AccountExpired,
    PolicyViolation,
    Unknown(String),
}

impl AuthRejectReason {
    /// Map an AD diagnostic sub-code (`data 775`) to a reason
    pub fn from_sub_code(sub_code: &str) -> Option<Self> {
        match sub_code.to_ascii_lowercase().as_str() {
            "52e" => Some(Self::InvalidCredentials),
            "773" => Some(Self::MustChangePassword),
            "775" => Some(Self::AccountLocked),
            "532" => Some(Self::PasswordExpired),
            "533" => Some(Self::AccountDisabled),
            "701" => Some(Self::AccountExpired),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::MustChangePassword => "must_change_password",
            Self::AccountLocked => "account_locked",
            Self::PasswordExpired => "password_expired",
            Self::AccountDisabled => "account_disabled",
            Self::AccountExpired => "account_expired",
            Self::PolicyViolation => "policy_violation",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for AuthRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => f.write_str("invalid username or password"),
            Self::MustChangePassword => {
                f.write_str("the password must be changed before the account can be used")
            }
            Self::AccountLocked => f.write_str("the account is locked"),
            Self::PasswordExpired => f.write_str("the password has expired"),
            Self::AccountDisabled => f.write_str("the account is disabled"),
            Self::AccountExpired => f.write_str("the account has expired"),
            Self::PolicyViolation => f.write_str("the password does not satisfy the policy"),
            Self::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// Result of a single bind attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum BindOutcome {
    Authenticated,
    Rejected(AuthRejectReason),
    /// The directory could not be asked; says nothing about the credentials
    TransportError(String),
}

impl BindOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Turn anything but `Authenticated` into the matching error
    pub fn into_result(self) -> crate::Result<()> {
        match self {
            Self::Authenticated => Ok(()),
            Self::Rejected(reason) => Err(crate::Error::Rejected(reason)),
            Self::TransportError(cause) => Err(crate::Error::Transport(cause)),
        }
    }
}

impl fmt::Display for BindOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated => f.write_str("authenticated"),
            Self::Rejected(reason) => write!(f, "rejected: {}", reason),
            Self::TransportError(cause) => write!(f, "transport error: {}", cause),
        }
    }
}

/// Extended-error markers AD puts at the front of a failed modify
const POLICY_VIOLATION_MARKER: &str = "0000052D";
const WRONG_OLD_PASSWORD_MARKER: &str = "00000056";
const CHANGE_NOT_PERMITTED_MARKER: &str = "00000005";

/// Reason the directory refused a password write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum PasswordChangeFailure {
    /// New password rejected by the password policy
    PolicyViolation,
    /// Old password did not match at the time of the write
    InvalidCredentials,
    /// The account may not change its password
    ChangeNotPermitted,
    Failed(String),
}

impl PasswordChangeFailure {
    /// Classify the raw text of a failed modify
    pub fn classify(raw: &str) -> Self {
        let upper = raw.to_ascii_uppercase();
        if upper.contains(POLICY_VIOLATION_MARKER) {
            Self::PolicyViolation
        } else if upper.contains(WRONG_OLD_PASSWORD_MARKER) {
            Self::InvalidCredentials
        } else if upper.contains(CHANGE_NOT_PERMITTED_MARKER) {
            Self::ChangeNotPermitted
        } else {
            Self::Failed(raw.to_string())
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::PolicyViolation => "policy_violation",
            Self::InvalidCredentials => "invalid_credentials",
            Self::ChangeNotPermitted => "change_not_permitted",
            Self::Failed(_) => "modify_failed",
        }
    }
}

impl fmt::Display for PasswordChangeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyViolation => {
                f.write_str("the new password does not satisfy the policy")
            }
            Self::InvalidCredentials => f.write_str("invalid username or password"),
            Self::ChangeNotPermitted => {
                f.write_str("this account is not permitted to change its password")
            }
            Self::Failed(raw) => write!(f, "unable to modify password: {}", raw),
        }
    }
}
