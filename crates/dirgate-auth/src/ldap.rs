//! `ldap3` backend for the directory transport traits
//!
//! Supports LDAP, LDAPS and STARTTLS connections.

use crate::tls;
use crate::transport::{
    AttributeChange, CertificatePolicy, DialPlan, DirectoryDialer, DirectoryTransport,
    ProtocolError, TlsNegotiation,
};
use async_trait::async_trait;
use dirgate_core::{RESULT_SIZE_LIMIT_EXCEEDED, RESULT_INVALID_CREDENTIALS};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Mod, Scope, SearchEntry, SearchOptions};
use rustls::ClientConfig;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Dials real directory servers with `ldap3`
#[derive(Debug, Clone, Copy, Default)]
pub struct Ldap3Dialer;

#[async_trait]
impl DirectoryDialer for Ldap3Dialer {
    async fn dial(&self, plan: &DialPlan) -> Result<Box<dyn DirectoryTransport>, ProtocolError> {
        let mut settings = LdapConnSettings::new()
            .set_conn_timeout(plan.timeout)
            .set_starttls(plan.negotiation == TlsNegotiation::StartTls);

        match tls_setup(&plan.certificates)? {
            TlsSetup::Default => {}
            TlsSetup::NoVerify => {
                warn!(
                    server = %plan.server_name,
                    "TLS certificate verification disabled for directory connection"
                );
                settings = settings.set_no_tls_verify(true);
            }
            TlsSetup::Roots(config) => settings = settings.set_config(config),
        }

        debug!("Connecting to LDAP server: {}", plan.url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &plan.url)
            .await
            .map_err(|e| {
                ProtocolError::Transport(format!("Failed to connect to LDAP server: {}", e))
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection driver error: {}", e);
            }
        });

        Ok(Box::new(Ldap3Transport {
            ldap,
            timeout: plan.timeout,
        }))
    }
}

/// Certificate handling applied to `LdapConnSettings`
enum TlsSetup {
    /// ldap3's own verifier over the system roots
    Default,
    /// `set_no_tls_verify(true)`
    NoVerify,
    /// `set_config` with a verifier over exactly these roots
    Roots(Arc<ClientConfig>),
}

fn tls_setup(policy: &CertificatePolicy) -> Result<TlsSetup, ProtocolError> {
    match policy {
        CertificatePolicy::NotApplicable | CertificatePolicy::Verify { trust_roots: None } => {
            Ok(TlsSetup::Default)
        }
        CertificatePolicy::Verify {
            trust_roots: Some(roots),
        } => Ok(TlsSetup::Roots(tls::client_config(roots)?)),
        CertificatePolicy::Skip => Ok(TlsSetup::NoVerify),
    }
}

/// One `ldap3` session
pub struct Ldap3Transport {
    ldap: Ldap,
    timeout: Duration,
}

fn check(result: LdapResult) -> Result<(), ProtocolError> {
    if result.rc == 0 {
        Ok(())
    } else {
        Err(ProtocolError::Result {
            code: result.rc,
            message: result.text,
        })
    }
}

fn transport_error(context: &str) -> impl Fn(ldap3::LdapError) -> ProtocolError + '_ {
    move |e| ProtocolError::Transport(format!("{}: {}", context, e))
}

fn to_mod(change: AttributeChange) -> Mod<Vec<u8>> {
    match change {
        AttributeChange::Add { attribute, values } => {
            Mod::Add(attribute.into_bytes(), values.into_iter().collect::<HashSet<_>>())
        }
        AttributeChange::Delete { attribute, values } => {
            Mod::Delete(attribute.into_bytes(), values.into_iter().collect::<HashSet<_>>())
        }
        AttributeChange::Replace { attribute, values } => {
            Mod::Replace(attribute.into_bytes(), values.into_iter().collect::<HashSet<_>>())
        }
    }
}

#[async_trait]
impl DirectoryTransport for Ldap3Transport {
    async fn bind(&mut self, principal: &str, secret: &str) -> Result<(), ProtocolError> {
        let result = self
            .ldap
            .with_timeout(self.timeout)
            .simple_bind(principal, secret)
            .await
            .map_err(transport_error("Bind failed"))?;

        if result.rc == RESULT_INVALID_CREDENTIALS {
            debug!("Bind for {} returned invalidCredentials", principal);
        }
        check(result)
    }

    async fn modify(
        &mut self,
        dn: &str,
        changes: Vec<AttributeChange>,
    ) -> Result<(), ProtocolError> {
        let mods: Vec<Mod<Vec<u8>>> = changes.into_iter().map(to_mod).collect();

        let result = self
            .ldap
            .with_timeout(self.timeout)
            .modify(dn, mods)
            .await
            .map_err(transport_error("Modify failed"))?;

        check(result)
    }

    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        size_limit: usize,
    ) -> Result<Vec<String>, ProtocolError> {
        let limit = i32::try_from(size_limit).unwrap_or(i32::MAX);

        // "1.1" asks for no attributes; only the DN is needed
        let result = self
            .ldap
            .with_search_options(SearchOptions::new().sizelimit(limit))
            .with_timeout(self.timeout)
            .search(base, Scope::Subtree, filter, vec!["1.1"])
            .await
            .map_err(transport_error("Search failed"))?;

        let ldap3::SearchResult(entries, status) = result;
        if status.rc != 0 && status.rc != RESULT_SIZE_LIMIT_EXCEEDED {
            return Err(ProtocolError::Result {
                code: status.rc,
                message: status.text,
            });
        }

        Ok(entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).dn)
            .collect())
    }

    async fn close(&mut self) -> Result<(), ProtocolError> {
        self.ldap
            .with_timeout(self.timeout)
            .unbind()
            .await
            .map_err(transport_error("Unbind failed"))
    }
}
