//! Time-bounded caches shared by every request.
//!
//! Entries are stored with an absolute expiry. An expired entry is never
//! returned; it is evicted lazily by the lookup that finds it.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use warden_core::config::CacheConfig;
use warden_db::model::{Role, User};

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe key/value cache whose entries expire a fixed time after insertion.
///
/// No size bound is applied: memory is bounded by the number of distinct keys
/// inserted within one time-to-live window.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `value`, replacing any previous entry. Expires `ttl` from now.
    pub fn put(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.insert(key, entry);
    }

    /// Returns the value if present and not expired.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }

        // The read guard must be dropped before removing from the same shard.
        // Re-check expiry so a concurrent fresh put survives.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    /// Evicts the entry unconditionally.
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key);
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until they are evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three caches owned by the identity resolver.
pub struct IdentityCaches {
    /// Raw `Authorization` header value -> user id.
    pub authorization: TtlCache<String, String>,
    /// User id -> role-expanded user.
    pub users: TtlCache<String, Arc<User>>,
    /// Role id -> role, including synthesized empty roles for unknown ids.
    pub roles: TtlCache<String, Arc<Role>>,
}

impl IdentityCaches {
    #[must_use]
    pub fn new(authorization_ttl: Duration, user_ttl: Duration, role_ttl: Duration) -> Self {
        Self {
            authorization: TtlCache::new(authorization_ttl),
            users: TtlCache::new(user_ttl),
            roles: TtlCache::new(role_ttl),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.authorization_ttl(),
            config.user_ttl(),
            config.role_ttl(),
        )
    }

    pub fn purge_expired(&self) {
        self.authorization.purge_expired();
        self.users.purge_expired();
        self.roles.purge_expired();
    }
}
