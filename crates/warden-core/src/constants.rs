/// Identifier of the identity assigned to callers without credentials.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Identifier of the super-user, validated against the configured admin password.
pub const ADMIN_USER: &str = "admin";

/// Role held by every resolved identity, anonymous included.
pub const EVERYONE_ROLE: &str = "everyone";

/// Role held by every identity that presented valid credentials.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// Role held only by the super-user.
pub const ADMIN_ROLE: &str = "administrators";

/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const SECURITY_ROUTE_COMPONENT: &str = "security";
pub const SECURITY_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", SECURITY_ROUTE_COMPONENT);
