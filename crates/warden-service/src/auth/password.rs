use base64::{Engine, engine::general_purpose::STANDARD};
use regex_lite::Regex;
use sha2::{Digest, Sha256};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Computes the stored form of a password: the base64 encoded SHA-256 digest
/// of its UTF-8 bytes.
///
/// A blank or absent password yields `None`, the "no hash" marker of
/// directory-backed accounts. `None` is never the digest of anything.
#[must_use]
pub fn hash_password(password: Option<&str>) -> Option<String> {
    let password = password.filter(|p| !p.trim().is_empty())?;
    let digest = Sha256::digest(password.as_bytes());
    Some(STANDARD.encode(digest))
}

/// ## Summary
/// Checks a plaintext password against a stored digest.
///
/// Blank passwords never match. The digests are compared in constant time.
#[must_use]
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    hash_password(Some(password))
        .is_some_and(|hash| constant_time_eq(hash.as_bytes(), password_hash.as_bytes()))
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Format every newly set password must match in full.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pattern: Regex,
}

impl PasswordPolicy {
    /// ## Summary
    /// Compiles the configured pattern. The pattern must match the whole password.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if the pattern is not a valid regex.
    pub fn new(pattern: &str) -> ServiceResult<Self> {
        let pattern = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            ServiceError::InvalidConfiguration(format!("Invalid password pattern: {e}"))
        })?;
        Ok(Self { pattern })
    }

    /// ## Errors
    /// Returns `InvalidRequest("INVALID_PASSWORD_FORMAT")` if the password does not match.
    pub fn check(&self, password: &str) -> ServiceResult<()> {
        if self.pattern.is_match(password) {
            Ok(())
        } else {
            Err(ServiceError::InvalidRequest(
                "INVALID_PASSWORD_FORMAT".to_string(),
            ))
        }
    }
}
