//! Password changes
//!
//! Two flows share the encoder:
//! - administrative reset: one `replace` of `unicodePwd` on a connection
//!   that already holds enough privilege;
//! - self-service change: bind with the old password, then one modify that
//!   deletes the old value and adds the new one, so the directory checks
//!   the old password again at the moment of the write.

use crate::client::DirectoryClient;
use crate::connection::DirectoryConnection;
use crate::encode::encode_password;
use crate::transport::{AttributeChange, ProtocolError};
use dirgate_core::types::{DistinguishedName, PasswordChangeFailure, PrincipalName};
use dirgate_core::{Error, Result, PASSWORD_ATTRIBUTE, UPN_ATTRIBUTE};
use tracing::{info, warn};

/// Map a failed password modify to an error
///
/// Directory answers are classified by their extended-error marker;
/// transport failures stay transport failures.
fn modify_error(err: Error) -> Error {
    match err {
        Error::Directory { code, message } => {
            let failure = PasswordChangeFailure::classify(&message);
            if let PasswordChangeFailure::Failed(_) = failure {
                Error::PasswordChange(PasswordChangeFailure::Failed(
                    ProtocolError::Result { code, message }.to_string(),
                ))
            } else {
                Error::PasswordChange(failure)
            }
        }
        other => other,
    }
}

/// Say which of the two passwords failed to encode
fn label(which: &str, err: Error) -> Error {
    match err {
        Error::Encoding(message) => Error::Encoding(format!("{}: {}", which, message)),
        other => other,
    }
}

impl DirectoryConnection {
    /// Set `dn`'s password without proof of the old one
    ///
    /// Privilege is not checked here; bind as an administrator first.
    pub async fn reset_password(&mut self, dn: &DistinguishedName, new_password: &str) -> Result<()> {
        let encoded = encode_password(new_password)?;
        self.replace_password(dn, encoded).await
    }

    async fn replace_password(&mut self, dn: &DistinguishedName, encoded: Vec<u8>) -> Result<()> {
        self.modify(
            dn.as_str(),
            vec![AttributeChange::replace(PASSWORD_ATTRIBUTE, encoded)],
        )
        .await
        .map_err(modify_error)?;

        info!(dn = %dn, "Password reset");
        Ok(())
    }

    /// Swap `old_encoded` for `new_encoded` in one atomic modify
    async fn swap_password(
        &mut self,
        dn: &DistinguishedName,
        old_encoded: Vec<u8>,
        new_encoded: Vec<u8>,
    ) -> Result<()> {
        self.modify(
            dn.as_str(),
            vec![
                AttributeChange::delete(PASSWORD_ATTRIBUTE, old_encoded),
                AttributeChange::add(PASSWORD_ATTRIBUTE, new_encoded),
            ],
        )
        .await
        .map_err(modify_error)
    }
}

impl DirectoryClient {
    /// Self-service password change for `username`
    pub async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let old_encoded = encode_password(old_password).map_err(|e| label("old password", e))?;
        let new_encoded = encode_password(new_password).map_err(|e| label("new password", e))?;

        let upn = self.config().upn(username)?;
        let mut conn = self.connect().await?;

        let result = change_on(&mut conn, &upn, old_password, old_encoded, new_encoded).await;
        conn.close().await;

        match &result {
            Ok(()) => info!(principal = %upn, "Password changed"),
            Err(e) => warn!(principal = %upn, code = e.code(), "Password change failed: {}", e),
        }
        result
    }

    /// Reset `target_username`'s password while bound as an administrator
    pub async fn admin_reset(
        &self,
        admin_username: &str,
        admin_password: &str,
        target_username: &str,
        new_password: &str,
    ) -> Result<()> {
        let new_encoded = encode_password(new_password)?;
        let admin = self.config().upn(admin_username)?;
        let target = self.config().upn(target_username)?;

        let mut conn = self.connect().await?;
        let result = reset_on(&mut conn, &admin, admin_password, &target, new_encoded).await;
        conn.close().await;

        match &result {
            Ok(()) => info!(admin = %admin, target = %target, "Administrative password reset"),
            Err(e) => warn!(admin = %admin, target = %target, code = e.code(), "Administrative reset failed: {}", e),
        }
        result
    }
}

async fn change_on(
    conn: &mut DirectoryConnection,
    upn: &PrincipalName,
    old_password: &str,
    old_encoded: Vec<u8>,
    new_encoded: Vec<u8>,
) -> Result<()> {
    conn.bind(upn, old_password).await.into_result()?;
    let dn = conn.resolve_dn(UPN_ATTRIBUTE, upn.as_str()).await?;
    conn.swap_password(&dn, old_encoded, new_encoded).await
}

async fn reset_on(
    conn: &mut DirectoryConnection,
    admin: &PrincipalName,
    admin_password: &str,
    target: &PrincipalName,
    new_encoded: Vec<u8>,
) -> Result<()> {
    conn.bind(admin, admin_password).await.into_result()?;
    let dn = conn.resolve_dn(UPN_ATTRIBUTE, target.as_str()).await?;
    conn.replace_password(&dn, new_encoded).await
}
