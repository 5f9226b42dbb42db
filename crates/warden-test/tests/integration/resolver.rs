//! End-to-end identity resolution properties.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use warden_test::component::auth::{RequestContext, RoleExpander, TtlCache, hash_password};
use warden_test::component::config::StoreConfig;
use warden_test::component::constants::{
    ADMIN_ROLE, ADMIN_USER, ANONYMOUS_USER, AUTHENTICATED_ROLE, EVERYONE_ROLE,
};
use warden_test::component::db::store::{SecurityStore, StoreRegistry};
use warden_test::component::error::ServiceError;

use super::helpers::*;

const LONG: Duration = Duration::from_secs(300);

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(ToString::to_string).collect()
}

fn resolve(
    fixture: &Fixture,
    header: Option<String>,
) -> Result<warden_test::component::auth::Identity, ServiceError> {
    fixture.resolver().resolve(&mut RequestContext::new(header))
}

#[test_log::test]
fn cyclic_roles_expand_to_the_whole_cycle() {
    let fixture = Fixture::new(LONG);
    let cache = TtlCache::new(LONG);
    let expander = RoleExpander::new(fixture.store.roles(), &cache);

    let closure = expander.expand(set(&["A"])).expect("expand");
    assert_eq!(closure, set(&["A", "B", "C"]));
    assert_eq!(expander.expand(closure.clone()).expect("expand"), closure);
}

#[test_log::test]
fn resolved_roles_are_closed_and_nominal() {
    let fixture = Fixture::new(LONG);
    let identity = resolve(&fixture, Some(basic("reader", READER_PASSWORD))).expect("reader");

    assert_eq!(
        identity.role_ids(),
        &set(&["reader", EVERYONE_ROLE, AUTHENTICATED_ROLE, "A", "B", "C"])
    );
}

#[test_log::test]
fn no_header_is_anonymous_with_everyone_only() {
    let fixture = Fixture::new(LONG);
    let identity = resolve(&fixture, None).expect("anonymous");

    assert!(identity.is_anonymous());
    assert_eq!(identity.id(), ANONYMOUS_USER);
    assert_eq!(identity.role_ids(), &set(&[EVERYONE_ROLE]));
}

#[test_log::test]
fn super_user_holds_every_nominal_role() {
    let fixture = Fixture::new(LONG);
    let identity = resolve(&fixture, Some(basic(ADMIN_USER, ADMIN_PASSWORD))).expect("admin");

    assert!(identity.role_ids().is_superset(&set(&[
        ADMIN_USER,
        EVERYONE_ROLE,
        AUTHENTICATED_ROLE,
        ADMIN_ROLE
    ])));
}

#[test_log::test]
fn nominal_role_records_are_not_expanded() {
    let fixture = Fixture::new(LONG);
    for (role_id, included) in [(ADMIN_USER, "editors"), (EVERYONE_ROLE, "readers")] {
        fixture
            .store
            .roles()
            .insert(warden_test::component::db::model::Role::including(
                role_id,
                [included],
            ))
            .expect("insert");
    }

    let identity = resolve(&fixture, Some(basic(ADMIN_USER, ADMIN_PASSWORD))).expect("admin");
    assert_eq!(
        identity.role_ids(),
        &set(&[ADMIN_USER, EVERYONE_ROLE, AUTHENTICATED_ROLE, ADMIN_ROLE])
    );
}

#[test_log::test]
fn padded_super_user_id_is_not_the_super_user() {
    let fixture = Fixture::new(LONG);
    assert!(matches!(
        resolve(&fixture, Some(basic(" admin ", ADMIN_PASSWORD))),
        Err(ServiceError::NotAuthorized)
    ));
}

#[test_log::test]
fn wrong_password_fails_for_every_account_kind() {
    let fixture = Fixture::new(LONG);

    for user_id in [ADMIN_USER, "jdoe", "ldapuser", "unknown-user"] {
        assert!(
            matches!(
                resolve(&fixture, Some(basic(user_id, "not-the-password"))),
                Err(ServiceError::NotAuthorized)
            ),
            "{user_id} should be rejected"
        );
    }
}

#[test_log::test]
fn rejection_message_does_not_name_the_branch() {
    let fixture = Fixture::new(LONG);
    let admin = resolve(&fixture, Some(basic(ADMIN_USER, "x"))).expect_err("rejected");
    let local = resolve(&fixture, Some(basic("jdoe", "x"))).expect_err("rejected");
    let directory = resolve(&fixture, Some(basic("ldapuser", "x"))).expect_err("rejected");

    assert_eq!(admin.to_string(), local.to_string());
    assert_eq!(local.to_string(), directory.to_string());
}

#[test_log::test]
fn cache_hit_skips_validation_until_expiry() {
    let fixture = Fixture::new(Duration::from_millis(100));
    let header = Some(basic("ldapuser", LDAP_PASSWORD));

    resolve(&fixture, header.clone()).expect("first");
    resolve(&fixture, header.clone()).expect("second");
    resolve(&fixture, header.clone()).expect("third");
    assert_eq!(fixture.directory.calls(), 1);

    std::thread::sleep(Duration::from_millis(150));
    resolve(&fixture, header).expect("after expiry");
    assert_eq!(fixture.directory.calls(), 2);
}

#[test_log::test]
fn cached_identity_is_trusted_within_the_window() {
    let fixture = Fixture::new(LONG);
    let header = Some(basic("jdoe", JDOE_PASSWORD));
    resolve(&fixture, header.clone()).expect("first");

    // Changed behind the service's back: no eviction.
    let mut jdoe = fixture
        .store
        .users()
        .select_by_id("jdoe")
        .expect("lookup")
        .expect("jdoe");
    jdoe.password_hash = hash_password(Some("something-else"));
    fixture.store.users().update(jdoe).expect("update");

    resolve(&fixture, header).expect("still trusted");
}

#[test_log::test]
fn password_change_forces_revalidation() {
    let fixture = Fixture::new(LONG);
    let old = Some(basic("jdoe", JDOE_PASSWORD));
    resolve(&fixture, old.clone()).expect("old password");

    fixture
        .service
        .change_password("jdoe", JDOE_PASSWORD, "a-new-password")
        .expect("changed");

    assert!(matches!(
        resolve(&fixture, old),
        Err(ServiceError::NotAuthorized)
    ));
    let identity = resolve(&fixture, Some(basic("jdoe", "a-new-password"))).expect("new");
    assert!(identity.has_role("readers"));
}

#[test_log::test]
fn role_update_is_seen_after_eviction() {
    let fixture = Fixture::new(LONG);
    resolve(&fixture, Some(basic("jdoe", JDOE_PASSWORD))).expect("jdoe");

    fixture
        .service
        .update_role(warden_test::component::db::model::Role::including(
            "writers",
            ["A"],
        ))
        .expect("updated");
    fixture.resolver().evict_user("jdoe");

    let identity = resolve(&fixture, Some(basic("jdoe", JDOE_PASSWORD))).expect("jdoe");
    assert!(identity.has_role("C"));
    assert!(!identity.has_role("readers"));
}

#[test_log::test]
fn concurrent_resolution_is_consistent() {
    let fixture = Arc::new(Fixture::new(LONG));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let fixture = Arc::clone(&fixture);
            std::thread::spawn(move || {
                for i in 0..100 {
                    let (user, password) = match (worker + i) % 3 {
                        0 => ("jdoe", JDOE_PASSWORD),
                        1 => ("reader", READER_PASSWORD),
                        _ => ("ldapuser", LDAP_PASSWORD),
                    };
                    let identity =
                        resolve(&fixture, Some(basic(user, password))).expect("resolved");
                    assert_eq!(identity.id(), user);
                    assert!(identity.has_role(AUTHENTICATED_ROLE));
                    if i % 25 == 0 {
                        fixture.resolver().evict_user(user);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
}

#[test_log::test]
fn unknown_backend_only_admits_the_super_user() {
    let store = StoreRegistry::new()
        .create(&StoreConfig {
            backend: "com.example.UnknownStore".to_string(),
            seed_file: None,
        })
        .expect("fallback store");
    assert_eq!(store.name(), "empty");

    let resolver = warden_test::component::auth::IdentityResolver::new(
        warden_test::component::auth::CredentialValidator::new(ADMIN_PASSWORD, store, None),
        warden_test::component::auth::IdentityCaches::new(LONG, LONG, LONG),
    );
    let mut ctx = RequestContext::new(Some(basic(ADMIN_USER, ADMIN_PASSWORD)));
    assert!(resolver.resolve(&mut ctx).is_ok());

    let mut ctx = RequestContext::new(Some(basic("jdoe", JDOE_PASSWORD)));
    assert!(matches!(
        resolver.resolve(&mut ctx),
        Err(ServiceError::NotAuthorized)
    ));
}
