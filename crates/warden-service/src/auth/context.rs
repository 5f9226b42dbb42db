use super::identity::Identity;

/// Resolution scope of a single request.
///
/// Holds the raw `Authorization` header and, once resolved, the identity, so
/// that a request resolves its caller at most once. Owned by the request; never
/// shared between requests.
#[derive(Default)]
pub struct RequestContext {
    authorization: Option<String>,
    identity: Option<Identity>,
}

// The raw header carries secrets.
impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("has_authorization", &self.authorization.is_some())
            .field("identity", &self.identity)
            .finish()
    }
}

impl RequestContext {
    #[must_use]
    pub fn new(authorization: Option<String>) -> Self {
        Self {
            authorization,
            identity: None,
        }
    }

    /// A context without credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The raw header value, blank headers reading as absent.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization
            .as_deref()
            .filter(|header| !header.trim().is_empty())
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub(crate) fn attach(&mut self, identity: Identity) -> Identity {
        self.identity = Some(identity.clone());
        identity
    }
}
