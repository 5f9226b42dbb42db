use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Record;

/// A role and the roles it includes.
///
/// The inclusion relation is the edge set of a directed graph that may contain
/// cycles and self-references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub role_ids: BTreeSet<String>,
}

impl Role {
    /// A role with no description and no included roles.
    #[must_use]
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            role_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn including<I, S>(id: impl Into<String>, role_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            description: None,
            role_ids: role_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Record for Role {
    const KIND: &'static str = "role";

    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(&self.id),
            "description" => self.description.as_deref(),
            _ => None,
        }
    }
}
