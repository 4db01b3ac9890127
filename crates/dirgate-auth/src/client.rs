//! Directory client
//!
//! Holds the immutable config and the dialer, and runs the top-level
//! operations. Every operation opens its own connection and closes it
//! before returning, whatever the result.

use crate::connection::DirectoryConnection;
use crate::ldap::Ldap3Dialer;
use crate::transport::DirectoryDialer;
use dirgate_core::types::{BindOutcome, DirectoryConfig};
use dirgate_core::Result;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct DirectoryClient {
    config: Arc<DirectoryConfig>,
    dialer: Arc<dyn DirectoryDialer>,
}

impl DirectoryClient {
    /// Client talking to a real directory through `ldap3`
    pub fn new(config: DirectoryConfig) -> Self {
        Self::with_dialer(config, Arc::new(Ldap3Dialer))
    }

    pub fn with_dialer(config: DirectoryConfig, dialer: Arc<dyn DirectoryDialer>) -> Self {
        Self {
            config: Arc::new(config),
            dialer,
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Open a fresh connection; the caller must `close` it
    pub async fn connect(&self) -> Result<DirectoryConnection> {
        DirectoryConnection::open(self.config.clone(), self.dialer.as_ref()).await
    }

    /// Check `username`'s credentials on a fresh connection
    pub async fn authenticate(&self, username: &str, secret: &str) -> Result<BindOutcome> {
        let upn = self.config.upn(username)?;
        let mut conn = self.connect().await?;

        let outcome = conn.bind(&upn, secret).await;
        conn.close().await;

        debug!(principal = %upn, outcome = %outcome, "Authentication finished");
        Ok(outcome)
    }
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("config", &self.config)
            .finish()
    }
}
