//! Directory authentication for Dirgate
//!
//! Credential checks and password changes against Active Directory style
//! LDAP servers. Each top-level operation on [`DirectoryClient`] runs on its
//! own connection, so a client can be cloned and shared across tasks.

pub mod bind;
pub mod client;
pub mod connection;
pub mod encode;
pub mod ldap;
pub mod password;
pub mod resolve;
pub mod transport;

mod tls;

#[cfg(test)]
mod testing;

pub use bind::{classify_bind_failure, reject_reason};
pub use client::DirectoryClient;
pub use connection::DirectoryConnection;
pub use encode::encode_password;
pub use ldap::{Ldap3Dialer, Ldap3Transport};
pub use transport::{
    AttributeChange, CertificatePolicy, DialPlan, DirectoryDialer, DirectoryTransport,
    ProtocolError, TlsNegotiation,
};
