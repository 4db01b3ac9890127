//! DN resolution

use crate::connection::DirectoryConnection;
use dirgate_core::types::DistinguishedName;
use dirgate_core::utils::is_attribute_name;
use dirgate_core::{Error, Result};
use ldap3::ldap_escape;
use tracing::debug;

/// Two results are enough to tell "unique" from "ambiguous"
const RESOLVE_SIZE_LIMIT: usize = 2;

/// `(attribute=value)` with the value escaped per RFC 4515
fn equality_filter(attribute: &str, value: &str) -> String {
    format!("({}={})", attribute, ldap_escape(value))
}

impl DirectoryConnection {
    /// Find the single entry whose `attribute` equals `value`
    pub async fn resolve_dn(&mut self, attribute: &str, value: &str) -> Result<DistinguishedName> {
        if !is_attribute_name(attribute) {
            return Err(Error::Configuration(format!(
                "invalid attribute name: {:?}",
                attribute
            )));
        }

        let base = self.config().search_base()?;
        let filter = equality_filter(attribute, value);

        debug!("Resolving DN under {} with filter: {}", base, filter);

        let mut dns = self
            .transport()
            .search(&base, &filter, RESOLVE_SIZE_LIMIT)
            .await?;

        match dns.len() {
            0 => Err(Error::NotFound {
                attribute: attribute.to_string(),
                value: value.to_string(),
            }),
            1 => {
                let dn = DistinguishedName::new(dns.remove(0));
                debug!("Found DN: {}", dn);
                Ok(dn)
            }
            count => Err(Error::Ambiguous {
                attribute: attribute.to_string(),
                value: value.to_string(),
                count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDirectory;
    use crate::transport::ProtocolError;
    use dirgate_core::types::{DirectoryConfig, SecurityMode};
    use std::sync::Arc;

    const JDOE_DN: &str = "CN=John Doe,OU=Staff,DC=corp,DC=example,DC=com";

    async fn open(directory: &FakeDirectory) -> DirectoryConnection {
        let config = Arc::new(
            DirectoryConfig::new("dc1", SecurityMode::Tls).with_domain("corp.example.com"),
        );
        DirectoryConnection::open(config, directory).await.unwrap()
    }

    #[test]
    fn test_equality_filter_escaping() {
        assert_eq!(
            equality_filter("userPrincipalName", "jdoe@corp.example.com"),
            "(userPrincipalName=jdoe@corp.example.com)"
        );
        assert_eq!(equality_filter("uid", "*)(uid=*"), r"(uid=\2a\29\28uid=\2a)");
        assert_eq!(equality_filter("cn", r"a\b"), r"(cn=a\5cb)");
        assert_eq!(equality_filter("cn", "a\0b"), r"(cn=a\00b)");
        assert_eq!(equality_filter("cn", "é"), "(cn=é)");
    }

    #[tokio::test]
    async fn test_resolves_single_entry() {
        let directory =
            FakeDirectory::new().with_account("jdoe@corp.example.com", JDOE_DN, "Secret1!");
        let mut conn = open(&directory).await;

        let dn = conn
            .resolve_dn("userPrincipalName", "jdoe@corp.example.com")
            .await
            .unwrap();
        assert_eq!(dn.as_str(), JDOE_DN);

        let searches = directory.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].0, "DC=corp,DC=example,DC=com");
        assert_eq!(searches[0].1, "(userPrincipalName=jdoe@corp.example.com)");
        conn.close().await;
    }

    #[tokio::test]
    async fn test_no_match() {
        let directory = FakeDirectory::new();
        let mut conn = open(&directory).await;

        let err = conn
            .resolve_dn("userPrincipalName", "ghost@corp.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        conn.close().await;
    }

    #[tokio::test]
    async fn test_ambiguous_match() {
        let directory = FakeDirectory::new()
            .with_account("jdoe@corp.example.com", JDOE_DN, "a")
            .with_account(
                "jdoe@corp.example.com",
                "CN=John Doe,OU=Contractors,DC=corp,DC=example,DC=com",
                "b",
            );
        let mut conn = open(&directory).await;

        let err = conn
            .resolve_dn("userPrincipalName", "jdoe@corp.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ambiguous { count: 2, .. }));
        conn.close().await;
    }

    #[tokio::test]
    async fn test_value_is_escaped() {
        let directory = FakeDirectory::new();
        let mut conn = open(&directory).await;

        let _ = conn.resolve_dn("userPrincipalName", "*)(cn=*").await;
        assert_eq!(
            directory.searches()[0].1,
            r"(userPrincipalName=\2a\29\28cn=\2a)"
        );
        conn.close().await;
    }

    #[tokio::test]
    async fn test_bad_attribute_never_searches() {
        let directory = FakeDirectory::new();
        let mut conn = open(&directory).await;

        let err = conn.resolve_dn("uid)(x", "jdoe").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(directory.searches().is_empty());
        conn.close().await;
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let directory = FakeDirectory::new()
            .fail_searches_with(ProtocolError::Transport("timed out".into()));
        let mut conn = open(&directory).await;

        let err = conn
            .resolve_dn("userPrincipalName", "jdoe@corp.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        conn.close().await;
    }
}
