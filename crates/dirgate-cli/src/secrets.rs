//! Password input
//!
//! Passwords come from their environment variable or, failing that, one
//! line each on stdin. There are no command line flags for them, so they
//! never show up in process listings or shell history. They are never
//! logged.

use anyhow::Result;
use dirgate_core::Error;
use std::io::BufRead;

pub const PASSWORD_VAR: &str = "DIRGATE_PASSWORD";
pub const OLD_PASSWORD_VAR: &str = "DIRGATE_OLD_PASSWORD";
pub const NEW_PASSWORD_VAR: &str = "DIRGATE_NEW_PASSWORD";
pub const ADMIN_PASSWORD_VAR: &str = "DIRGATE_ADMIN_PASSWORD";

/// `value` if set, else the next line of `input`
pub fn read_secret(value: Option<String>, name: &str, input: &mut impl BufRead) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| Error::Input(format!("failed to read {}: {}", name, e)))?;
    if read == 0 {
        return Err(Error::Input(format!(
            "no {} given: set it in the environment or pipe it on stdin",
            name
        ))
        .into());
    }

    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

/// The secret in environment variable `var`, else a line of stdin
pub fn secret(var: &str, name: &str) -> Result<String> {
    read_secret(std::env::var(var).ok(), name, &mut std::io::stdin().lock())
}
