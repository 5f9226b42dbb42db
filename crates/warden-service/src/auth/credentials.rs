//! `Authorization` header parsing.
//!
//! A header is `<scheme> <payload>`. Anything that does not parse to a
//! recognised scheme is not an error: the caller is simply anonymous.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Credentials presented by a caller.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Basic base64(user_id:password)`.
    Basic { user_id: String, password: String },
    /// `Bearer <token>`, the token being opaque.
    Bearer(String),
}

// Keeps passwords and tokens out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { user_id, .. } => f
                .debug_struct("Basic")
                .field("user_id", user_id)
                .finish_non_exhaustive(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

impl Credentials {
    /// ## Summary
    /// Parses a raw header value.
    ///
    /// Returns `None`, meaning anonymous, when the header is not exactly two
    /// whitespace separated tokens, the scheme is neither `basic` nor `bearer`
    /// (case-insensitive), or a basic payload is not valid base64 / UTF-8 or
    /// lacks the `:` separator. The user id ends at the first colon.
    #[must_use]
    pub fn parse(header: &str) -> Option<Self> {
        let mut tokens = header.split_whitespace();
        let (Some(scheme), Some(payload), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return None;
        };

        if scheme.eq_ignore_ascii_case("basic") {
            let decoded = STANDARD.decode(payload).ok()?;
            let decoded = String::from_utf8(decoded).ok()?;
            let (user_id, password) = decoded.split_once(':')?;
            Some(Self::Basic {
                user_id: user_id.to_string(),
                password: password.to_string(),
            })
        } else if scheme.eq_ignore_ascii_case("bearer") {
            Some(Self::Bearer(payload.to_string()))
        } else {
            None
        }
    }

    /// Builds the header value for basic credentials.
    #[must_use]
    pub fn basic_header(user_id: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user_id}:{password}")))
    }
}
