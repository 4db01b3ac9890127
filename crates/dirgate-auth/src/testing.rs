//! In-memory directory for tests

use crate::encode::encode_password;
use crate::transport::{
    AttributeChange, DialPlan, DirectoryDialer, DirectoryTransport, ProtocolError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// AD-style diagnostic for a failed bind carrying `code` as its sub-code
pub(crate) fn ad_bind_error(code: &str) -> String {
    format!(
        "80090308: LdapErr: DSID-0C09042A, comment: AcceptSecurityContext error, data {}, v3839",
        code
    )
}

const STALE_PASSWORD_ERROR: &str = "00000056: AtrErr: DSID-03190F80, #1:\n\t0: 00000056: DSID-03190F80, problem 1005 (CONSTRAINT_ATT_TYPE), data 0, Att 9005a (unicodePwd)";

struct Account {
    upn: String,
    /// `None` for principals that can bind but are not found by search
    dn: Option<String>,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    rotate_after_bind: Option<(String, String)>,

    fail_dial: Option<ProtocolError>,
    fail_bind: Option<ProtocolError>,
    fail_search: Option<ProtocolError>,
    fail_modify: Option<ProtocolError>,

    dials: Vec<DialPlan>,
    binds: Vec<String>,
    searches: Vec<(String, String)>,
    modifies: Vec<(String, Vec<AttributeChange>)>,
    closes: usize,
}

/// Shared fake: every transport it dials sees the same accounts and
/// records into the same log
#[derive(Clone, Default)]
pub(crate) struct FakeDirectory {
    state: Arc<Mutex<State>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, upn: &str, dn: &str, password: &str) -> Self {
        self.state.lock().accounts.push(Account {
            upn: upn.to_string(),
            dn: Some(dn.to_string()),
            password: password.to_string(),
        });
        self
    }

    pub fn with_bind_only_account(self, upn: &str, password: &str) -> Self {
        self.state.lock().accounts.push(Account {
            upn: upn.to_string(),
            dn: None,
            password: password.to_string(),
        });
        self
    }

    /// After the next successful bind, change `upn`'s password behind the
    /// client's back
    pub fn rotate_password_after_bind(self, upn: &str, password: &str) -> Self {
        self.state.lock().rotate_after_bind = Some((upn.to_string(), password.to_string()));
        self
    }

    pub fn fail_dial_with(self, err: ProtocolError) -> Self {
        self.state.lock().fail_dial = Some(err);
        self
    }

    pub fn fail_binds_with(self, err: ProtocolError) -> Self {
        self.state.lock().fail_bind = Some(err);
        self
    }

    pub fn fail_searches_with(self, err: ProtocolError) -> Self {
        self.state.lock().fail_search = Some(err);
        self
    }

    pub fn fail_modifies_with(self, err: ProtocolError) -> Self {
        self.state.lock().fail_modify = Some(err);
        self
    }

    pub fn dials(&self) -> Vec<DialPlan> {
        self.state.lock().dials.clone()
    }

    pub fn binds(&self) -> Vec<String> {
        self.state.lock().binds.clone()
    }

    pub fn searches(&self) -> Vec<(String, String)> {
        self.state.lock().searches.clone()
    }

    pub fn modifies(&self) -> Vec<(String, Vec<AttributeChange>)> {
        self.state.lock().modifies.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    pub fn password_of(&self, upn: &str) -> Option<String> {
        self.state
            .lock()
            .accounts
            .iter()
            .find(|a| a.upn == upn)
            .map(|a| a.password.clone())
    }
}

#[async_trait]
impl DirectoryDialer for FakeDirectory {
    async fn dial(&self, plan: &DialPlan) -> Result<Box<dyn DirectoryTransport>, ProtocolError> {
        let mut state = self.state.lock();
        state.dials.push(plan.clone());
        if let Some(err) = state.fail_dial.clone() {
            return Err(err);
        }

        Ok(Box::new(FakeTransport {
            directory: self.clone(),
        }))
    }
}

struct FakeTransport {
    directory: FakeDirectory,
}

/// Inverse of `encode_password`, for applying writes
fn decode_password(value: &[u8]) -> Option<String> {
    if value.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = value
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let quoted = String::from_utf16(&units).ok()?;
    quoted
        .strip_prefix('"')?
        .strip_suffix('"')
        .map(str::to_string)
}

/// `(attribute=value)` with no nesting
fn parse_filter(filter: &str) -> Option<(&str, &str)> {
    filter.strip_prefix('(')?.strip_suffix(')')?.split_once('=')
}

#[async_trait]
impl DirectoryTransport for FakeTransport {
    async fn bind(&mut self, principal: &str, secret: &str) -> Result<(), ProtocolError> {
        let mut state = self.directory.state.lock();
        state.binds.push(principal.to_string());
        if let Some(err) = state.fail_bind.clone() {
            return Err(err);
        }

        let accepted = state
            .accounts
            .iter()
            .any(|a| a.upn == principal && a.password == secret);
        if !accepted {
            return Err(ProtocolError::Result {
                code: 49,
                message: ad_bind_error("52e"),
            });
        }

        if let Some((upn, password)) = state.rotate_after_bind.take() {
            for account in state.accounts.iter_mut().filter(|a| a.upn == upn) {
                account.password = password.clone();
            }
        }
        Ok(())
    }

    async fn modify(
        &mut self,
        dn: &str,
        changes: Vec<AttributeChange>,
    ) -> Result<(), ProtocolError> {
        let mut state = self.directory.state.lock();
        state.modifies.push((dn.to_string(), changes.clone()));
        if let Some(err) = state.fail_modify.clone() {
            return Err(err);
        }

        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.dn.as_deref() == Some(dn))
            .ok_or_else(|| ProtocolError::Result {
                code: 32,
                message: format!("0000208D: NameErr: DSID-03100241, problem 2001 (NO_OBJECT), data 0, best match of: '{}'", dn),
            })?;

        // All changes apply or none do
        let mut password = account.password.clone();
        for change in &changes {
            match change {
                AttributeChange::Delete { values, .. } => {
                    let current = encode_password(&password).map_err(|e| {
                        ProtocolError::Transport(e.to_string())
                    })?;
                    if !values.contains(&current) {
                        return Err(ProtocolError::Result {
                            code: 19,
                            message: STALE_PASSWORD_ERROR.to_string(),
                        });
                    }
                }
                AttributeChange::Add { values, .. } | AttributeChange::Replace { values, .. } => {
                    password = values
                        .first()
                        .and_then(|v| decode_password(v))
                        .ok_or_else(|| ProtocolError::Result {
                            code: 21,
                            message: "00000057: LdapErr: DSID-0C090D11, comment: Error in attribute conversion operation, data 0".into(),
                        })?;
                }
            }
        }
        account.password = password;
        Ok(())
    }

    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        size_limit: usize,
    ) -> Result<Vec<String>, ProtocolError> {
        let mut state = self.directory.state.lock();
        state.searches.push((base.to_string(), filter.to_string()));
        if let Some(err) = state.fail_search.clone() {
            return Err(err);
        }

        let Some((attribute, value)) = parse_filter(filter) else {
            return Ok(Vec::new());
        };
        if !attribute.eq_ignore_ascii_case("userPrincipalName") {
            return Ok(Vec::new());
        }

        Ok(state
            .accounts
            .iter()
            .filter(|a| a.upn == value)
            .filter_map(|a| a.dn.clone())
            .take(size_limit)
            .collect())
    }

    async fn close(&mut self) -> Result<(), ProtocolError> {
        self.directory.state.lock().closes += 1;
        Ok(())
    }
}
