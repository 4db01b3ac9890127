//! Identity types
//!
//! A principal name is what a user binds with; a distinguished name is
//! what the directory modifies. They are separate types so one can never
//! be passed where the other is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User principal name (`user@domain`), used for bind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalName(String);

impl PrincipalName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory distinguished name, used for modify operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistinguishedName(String);

impl DistinguishedName {
    pub fn new(dn: impl Into<String>) -> Self {
        Self(dn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
