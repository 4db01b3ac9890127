//! Directory connections
//!
//! A [`DirectoryConnection`] is one transport session plus the config that
//! opened it. It serves exactly one logical operation and is consumed by
//! [`DirectoryConnection::close`], so it cannot be used afterwards.

use crate::transport::{AttributeChange, DialPlan, DirectoryDialer, DirectoryTransport};
use dirgate_core::types::DirectoryConfig;
use dirgate_core::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// What the last bind on this connection achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindState {
    /// No bind attempted; the session is anonymous
    Anonymous,
    Authenticated,
    /// The last bind did not authenticate
    Failed,
}

pub struct DirectoryConnection {
    transport: Box<dyn DirectoryTransport>,
    config: Arc<DirectoryConfig>,
    bind_state: BindState,
}

impl DirectoryConnection {
    /// Open a connection as described by `config`
    pub async fn open(config: Arc<DirectoryConfig>, dialer: &dyn DirectoryDialer) -> Result<Self> {
        config.validate()?;

        let plan = DialPlan::from_config(&config);
        debug!(
            url = %plan.url,
            security = %config.security,
            "Opening directory connection"
        );

        let transport = dialer
            .dial(&plan)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        info!(server = %config.server, security = %config.security, "Directory connection established");

        Ok(Self {
            transport,
            config,
            bind_state: BindState::Anonymous,
        })
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.bind_state == BindState::Authenticated
    }

    /// Unbind and release the session
    pub async fn close(mut self) {
        if let Err(e) = self.transport.close().await {
            debug!("Error while closing directory connection: {}", e);
        }
    }

    pub(crate) fn transport(&mut self) -> &mut dyn DirectoryTransport {
        self.transport.as_mut()
    }

    pub(crate) fn set_bind_state(&mut self, state: BindState) {
        self.bind_state = state;
    }

    /// Send a modify, refusing if the last bind on this connection failed
    pub(crate) async fn modify(&mut self, dn: &str, changes: Vec<AttributeChange>) -> Result<()> {
        if self.bind_state == BindState::Failed {
            return Err(Error::BindRequired(
                "refusing to modify after a failed bind".into(),
            ));
        }

        self.transport
            .modify(dn, changes)
            .await
            .map_err(Error::from)
    }
}

impl std::fmt::Debug for DirectoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConnection")
            .field("server", &self.config.server)
            .field("security", &self.config.security)
            .field("bind_state", &self.bind_state)
            .finish()
    }
}
