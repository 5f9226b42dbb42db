use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use serde::Serialize;
use warden_core::constants::{ANONYMOUS_USER, EVERYONE_ROLE};
use warden_db::model::User;

static ANONYMOUS: LazyLock<Arc<User>> = LazyLock::new(|| {
    let mut user = User::synthetic(ANONYMOUS_USER);
    user.role_ids.insert(EVERYONE_ROLE.to_string());
    Arc::new(user)
});

/// The caller of a request, as handed to request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No usable credentials. Holds only the `everyone` role.
    Anonymous,
    /// A validated user whose role set is closed under inclusion.
    User(Arc<User>),
}

impl Identity {
    /// The user record behind the identity; the fixed anonymous user for
    /// [`Identity::Anonymous`].
    #[must_use]
    pub fn user(&self) -> &User {
        match self {
            Self::Anonymous => ANONYMOUS.as_ref(),
            Self::User(user) => user.as_ref(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.user().id
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    #[must_use]
    pub fn has_role(&self, role_id: &str) -> bool {
        self.user().has_role(role_id)
    }

    #[must_use]
    pub fn role_ids(&self) -> &BTreeSet<String> {
        &self.user().role_ids
    }
}

#[derive(Serialize)]
struct IdentityView<'a> {
    id: &'a str,
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    anonymous: bool,
    role_ids: &'a BTreeSet<String>,
}

// Never exposes the password hash.
impl Serialize for Identity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let user = self.user();
        IdentityView {
            id: &user.id,
            display_name: &user.display_name,
            email: user.email.as_deref(),
            anonymous: self.is_anonymous(),
            role_ids: &user.role_ids,
        }
        .serialize(serializer)
    }
}
