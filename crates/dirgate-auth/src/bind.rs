//! Credential verification
//!
//! Binds a principal and classifies the directory's answer. Active
//! Directory reports why an invalidCredentials bind failed through a
//! sub-code in the diagnostic text (`..., data 775, v3839`); that sub-code
//! picks the [`AuthRejectReason`].

use crate::connection::{BindState, DirectoryConnection};
use crate::transport::ProtocolError;
use dirgate_core::types::{AuthRejectReason, BindOutcome, PrincipalName, BIND_SUB_CODES};
use dirgate_core::RESULT_INVALID_CREDENTIALS;
use tracing::{debug, info, warn};

impl DirectoryConnection {
    /// Authenticate `principal` with `secret` on this connection
    ///
    /// An empty secret is never sent: many directories accept it as an
    /// unauthenticated bind, which must not read as success.
    pub async fn bind(&mut self, principal: &PrincipalName, secret: &str) -> BindOutcome {
        if secret.is_empty() {
            debug!(principal = %principal, "Empty secret, bind not attempted");
            self.set_bind_state(BindState::Failed);
            return BindOutcome::Rejected(AuthRejectReason::InvalidCredentials);
        }

        let outcome = match self.transport().bind(principal.as_str(), secret).await {
            Ok(()) => BindOutcome::Authenticated,
            Err(e) => classify_bind_failure(e),
        };

        match &outcome {
            BindOutcome::Authenticated => {
                info!(principal = %principal, "Bind succeeded");
                self.set_bind_state(BindState::Authenticated);
            }
            BindOutcome::Rejected(reason) => {
                info!(principal = %principal, reason = reason.code(), "Bind rejected");
                self.set_bind_state(BindState::Failed);
            }
            BindOutcome::TransportError(cause) => {
                warn!(principal = %principal, "Bind failed: {}", cause);
                self.set_bind_state(BindState::Failed);
            }
        }

        outcome
    }
}

/// Sort a failed bind into a rejection or a transport failure
pub fn classify_bind_failure(err: ProtocolError) -> BindOutcome {
    match err {
        ProtocolError::Result { code, message } if code == RESULT_INVALID_CREDENTIALS => {
            BindOutcome::Rejected(reject_reason(&message))
        }
        other => BindOutcome::TransportError(other.to_string()),
    }
}

/// Reason for an invalidCredentials diagnostic message
///
/// The `data <code>` token wins when present. Without one, the message is
/// scanned for any known sub-code. Anything unrecognized comes back as
/// `Unknown` with the message untouched.
pub fn reject_reason(message: &str) -> AuthRejectReason {
    if let Some(sub_code) = diagnostic_sub_code(message) {
        return AuthRejectReason::from_sub_code(sub_code)
            .unwrap_or_else(|| AuthRejectReason::Unknown(message.to_string()));
    }

    BIND_SUB_CODES
        .iter()
        .find(|code| message.contains(*code))
        .and_then(|code| AuthRejectReason::from_sub_code(code))
        .unwrap_or_else(|| AuthRejectReason::Unknown(message.to_string()))
}

/// The hex token after `data ` in an AD diagnostic
fn diagnostic_sub_code(message: &str) -> Option<&str> {
    let start = message.find("data ")? + "data ".len();
    let rest = &message[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ad_bind_error, FakeDirectory};
    use dirgate_core::types::{DirectoryConfig, SecurityMode};
    use std::sync::Arc;

    async fn open(directory: &FakeDirectory) -> DirectoryConnection {
        let config = Arc::new(DirectoryConfig::new("dc1", SecurityMode::Tls));
        DirectoryConnection::open(config, directory).await.unwrap()
    }

    fn jdoe() -> PrincipalName {
        PrincipalName::new("jdoe@corp.example.com")
    }

    #[test]
    fn test_reason_table() {
        let cases = [
            ("52e", AuthRejectReason::InvalidCredentials),
            ("773", AuthRejectReason::MustChangePassword),
            ("775", AuthRejectReason::AccountLocked),
            ("532", AuthRejectReason::PasswordExpired),
            ("533", AuthRejectReason::AccountDisabled),
            ("701", AuthRejectReason::AccountExpired),
        ];
        for (code, expected) in cases {
            assert_eq!(reject_reason(&ad_bind_error(code)), expected, "{code}");
        }
    }

    #[test]
    fn test_unknown_sub_code_keeps_message() {
        let message = ad_bind_error("999");
        assert_eq!(
            reject_reason(&message),
            AuthRejectReason::Unknown(message.clone())
        );
    }

    #[test]
    fn test_sub_code_without_data_token() {
        assert_eq!(
            reject_reason("Invalid credentials (775)"),
            AuthRejectReason::AccountLocked
        );
        assert_eq!(
            reject_reason("invalid credentials"),
            AuthRejectReason::Unknown("invalid credentials".into())
        );
    }

    #[test]
    fn test_data_token_is_not_confused_by_other_digits() {
        // DSID contains 52E-like text, the data token says locked
        let message = "80090308: LdapErr: DSID-0C09052e, comment: AcceptSecurityContext error, data 775, v4563";
        assert_eq!(reject_reason(message), AuthRejectReason::AccountLocked);
    }

    #[test]
    fn test_non_credentials_error_is_transport() {
        let outcome = classify_bind_failure(ProtocolError::Result {
            code: 52,
            message: "unavailable".into(),
        });
        assert!(matches!(outcome, BindOutcome::TransportError(_)));

        let outcome = classify_bind_failure(ProtocolError::Transport("connection reset".into()));
        assert_eq!(
            outcome,
            BindOutcome::TransportError("connection reset".into())
        );
    }

    #[tokio::test]
    async fn test_empty_secret_skips_round_trip() {
        let directory = FakeDirectory::new().with_account(
            "jdoe@corp.example.com",
            "CN=John Doe,OU=Staff,DC=corp,DC=example,DC=com",
            "Secret1!",
        );
        let mut conn = open(&directory).await;

        let outcome = conn.bind(&jdoe(), "").await;
        assert_eq!(
            outcome,
            BindOutcome::Rejected(AuthRejectReason::InvalidCredentials)
        );
        assert!(directory.binds().is_empty());
        assert!(!conn.is_authenticated());
        conn.close().await;
    }

    #[tokio::test]
    async fn test_bind_success() {
        let directory = FakeDirectory::new().with_account(
            "jdoe@corp.example.com",
            "CN=John Doe,OU=Staff,DC=corp,DC=example,DC=com",
            "Secret1!",
        );
        let mut conn = open(&directory).await;

        assert_eq!(conn.bind(&jdoe(), "Secret1!").await, BindOutcome::Authenticated);
        assert!(conn.is_authenticated());
        assert_eq!(directory.binds(), vec!["jdoe@corp.example.com".to_string()]);
        conn.close().await;
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let directory = FakeDirectory::new().with_account(
            "jdoe@corp.example.com",
            "CN=John Doe,OU=Staff,DC=corp,DC=example,DC=com",
            "Secret1!",
        );
        let mut conn = open(&directory).await;

        assert_eq!(
            conn.bind(&jdoe(), "wrong").await,
            BindOutcome::Rejected(AuthRejectReason::InvalidCredentials)
        );
        conn.close().await;
    }

    #[tokio::test]
    async fn test_locked_account() {
        let directory = FakeDirectory::new().fail_binds_with(ProtocolError::Result {
            code: 49,
            message: ad_bind_error("775"),
        });
        let mut conn = open(&directory).await;

        assert_eq!(
            conn.bind(&jdoe(), "Secret1!").await,
            BindOutcome::Rejected(AuthRejectReason::AccountLocked)
        );
        conn.close().await;
    }

    #[tokio::test]
    async fn test_unrecognized_sub_code() {
        let message = ad_bind_error("999");
        let directory = FakeDirectory::new().fail_binds_with(ProtocolError::Result {
            code: 49,
            message: message.clone(),
        });
        let mut conn = open(&directory).await;

        assert_eq!(
            conn.bind(&jdoe(), "Secret1!").await,
            BindOutcome::Rejected(AuthRejectReason::Unknown(message))
        );
        conn.close().await;
    }

    #[tokio::test]
    async fn test_transport_reset_is_not_a_rejection() {
        let directory = FakeDirectory::new()
            .fail_binds_with(ProtocolError::Transport("connection reset by peer".into()));
        let mut conn = open(&directory).await;

        let outcome = conn.bind(&jdoe(), "Secret1!").await;
        assert!(matches!(outcome, BindOutcome::TransportError(ref c) if c.contains("reset")));
        assert!(!conn.is_authenticated());
        conn.close().await;
    }
}
