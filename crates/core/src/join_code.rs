//! Workshop join-code generation and validation.
//!
//! Codes are the only external-facing natural key a workshop carries.
//! Uniqueness is *not* guaranteed here — the caller inserts and retries on a
//! unique-constraint collision rather than assuming a fresh draw is free.

use rand::Rng;

use crate::error::CoreError;

/// Join codes are exactly this many characters.
pub const CODE_LENGTH: usize = 6;

/// Uppercase alphanumeric alphabet used for join codes.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random 6-character uppercase alphanumeric join code.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Normalize and validate a user-supplied join code.
///
/// Trims surrounding whitespace and uppercases before checking, so codes
/// typed on phones ("ab 12cd ") still resolve. Returns
/// [`CoreError::Validation`] when the result is not exactly six uppercase
/// alphanumeric characters.
pub fn normalize(raw: &str) -> Result<String, CoreError> {
    let code: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if code.len() != CODE_LENGTH || !code.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(CoreError::Validation(format!(
            "Join code must be {CODE_LENGTH} letters or digits"
        )));
    }
    Ok(code)
}
