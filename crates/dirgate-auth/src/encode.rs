//! Password encoding for the `unicodePwd` attribute
//!
//! Active Directory takes the password as UTF-16LE, without a byte-order
//! mark, of the plaintext wrapped in double quotes.

use dirgate_core::{Error, Result};

/// Encode `plaintext` as the directory expects it in `unicodePwd`
pub fn encode_password(plaintext: &str) -> Result<Vec<u8>> {
    if plaintext.contains('\0') {
        return Err(Error::Encoding(
            "password contains a NUL character".into(),
        ));
    }

    let quoted = format!("\"{}\"", plaintext);
    let mut encoded = Vec::with_capacity(quoted.len() * 2);
    for unit in quoted.encode_utf16() {
        encoded.extend_from_slice(&unit.to_le_bytes());
    }
    Ok(encoded)
}
