//! TLS client configuration for directory connections

use crate::transport::ProtocolError;
use dirgate_core::types::TrustRoots;
use rustls::{Certificate, ClientConfig, RootCertStore};
use std::sync::Arc;
use tracing::debug;

/// Client config trusting exactly `roots`, with full chain and host name
/// validation
pub(crate) fn client_config(roots: &TrustRoots) -> Result<Arc<ClientConfig>, ProtocolError> {
    let mut store = RootCertStore::empty();
    for der in roots.certificates() {
        store.add(&Certificate(der.clone())).map_err(|e| {
            ProtocolError::Transport(format!("Failed to add CA certificate: {}", e))
        })?;
    }
    debug!("Loaded {} trusted CA certificate(s)", store.len());

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(store)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage_certificate() {
        let roots = TrustRoots::from_der(vec![b"not der".to_vec()]).unwrap();
        assert!(client_config(&roots).is_err());
    }
}
