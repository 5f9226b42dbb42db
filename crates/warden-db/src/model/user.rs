use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Record;

/// A stored account.
///
/// A user without a `password_hash` is a directory-backed account: its
/// credentials are checked by the external directory, never locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub role_ids: BTreeSet<String>,
}

impl User {
    /// ## Summary
    /// Builds the stand-in record for an id unknown to storage: the display name
    /// is the id, there is no password hash and no roles.
    #[must_use]
    pub fn synthetic(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            email: None,
            password_hash: None,
            role_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.contains(role_id)
    }
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(&self.id),
            "displayName" => Some(&self.display_name),
            "email" => self.email.as_deref(),
            _ => None,
        }
    }
}

/// Writable shape of a user: carries a plaintext password instead of a hash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role_ids: BTreeSet<String>,
}

impl NewUser {
    /// ## Summary
    /// Converts into a stored record with the given password hash.
    #[must_use]
    pub fn into_user(self, password_hash: Option<String>) -> User {
        User {
            id: self.id,
            display_name: self.display_name,
            email: self.email,
            password_hash,
            role_ids: self.role_ids,
        }
    }
}
