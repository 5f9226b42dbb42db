//! HTTP surface tests: authentication middleware, whoami and administration
//! routes, driven through salvo's `TestClient`.

use std::time::Duration;

use salvo::http::StatusCode;
use serde_json::json;
use warden_test::component::constants::{
    ADMIN_ROLE, ADMIN_USER, AUTHENTICATED_ROLE, EVERYONE_ROLE,
};

use super::helpers::*;

const LONG: Duration = Duration::from_secs(300);

#[test_log::test(tokio::test)]
async fn healthcheck_is_public() {
    let fixture = Fixture::new(LONG);
    let service = fixture.http();
    let body = TestRequest::get("/api/app/healthcheck")
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body, json!({ "status": "OK", "store": "memory", "cached_identities": 0 }));

    TestRequest::get("/api/app/whoami")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let body = TestRequest::get("/api/app/healthcheck")
        .send(&service)
        .await
        .json();
    assert_eq!(body["cached_identities"], 1);
}

#[test_log::test(tokio::test)]
async fn whoami_without_credentials_is_anonymous() {
    let fixture = Fixture::new(LONG);
    let body = TestRequest::get("/api/app/whoami")
        .send(&fixture.http())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["anonymous"], true);
    assert_eq!(body["role_ids"], json!([EVERYONE_ROLE]));
}

#[test_log::test(tokio::test)]
async fn whoami_with_admin_credentials() {
    let fixture = Fixture::new(LONG);
    let body = TestRequest::get("/api/app/whoami")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .send(&fixture.http())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["id"], ADMIN_USER);
    let roles = body["role_ids"].as_array().expect("role list");
    for role in [ADMIN_USER, EVERYONE_ROLE, AUTHENTICATED_ROLE, ADMIN_ROLE] {
        assert!(roles.contains(&json!(role)), "missing {role}");
    }
}

#[test_log::test(tokio::test)]
async fn whoami_never_exposes_the_hash() {
    let fixture = Fixture::new(LONG);
    let response = TestRequest::get("/api/app/whoami")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .send(&fixture.http())
        .await
        .assert_status(StatusCode::OK);
    assert!(!response.body.contains("password_hash"));
    assert_eq!(response.json()["display_name"], "John Doe");
}

#[test_log::test(tokio::test)]
async fn bad_credentials_get_401_with_challenge() {
    let fixture = Fixture::new(LONG);
    let response = TestRequest::get("/api/app/whoami")
        .basic_auth("jdoe", "wrong-password")
        .send(&fixture.http())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header_contains("www-authenticate", "Basic");
    assert_eq!(response.json()["error"], "Not authorized");
}

#[test_log::test(tokio::test)]
async fn malformed_authorization_is_anonymous() {
    let fixture = Fixture::new(LONG);
    let body = TestRequest::get("/api/app/whoami")
        .authorization("Negotiate abc")
        .send(&fixture.http())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["anonymous"], true);
}

#[test_log::test(tokio::test)]
async fn bearer_without_resolver_is_anonymous() {
    let fixture = Fixture::new(LONG);
    let body = TestRequest::get("/api/app/whoami")
        .authorization("Bearer some.opaque.token")
        .send(&fixture.http())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["anonymous"], true);
}

#[test_log::test(tokio::test)]
async fn administration_requires_the_administrators_role() {
    let fixture = Fixture::new(LONG);
    let service = fixture.http();

    TestRequest::get("/api/security/users")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    TestRequest::get("/api/security/users")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    TestRequest::get("/api/security/roles")
        .basic_auth("reader", READER_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn admin_lists_users_without_hashes() {
    let fixture = Fixture::new(LONG);
    let response = TestRequest::get("/api/security/users?%24orderby=id%20desc")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .send(&fixture.http())
        .await
        .assert_status(StatusCode::OK);

    assert!(!response.body.contains("password_hash"));
    let ids: Vec<_> = response
        .json()
        .as_array()
        .expect("user list")
        .iter()
        .map(|u| u["id"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["reader", "ldapuser", "jdoe"]);
}

#[test_log::test(tokio::test)]
async fn admin_filters_users_and_bad_filters_are_400() {
    let fixture = Fixture::new(LONG);
    let service = fixture.http();

    let body = TestRequest::get("/api/security/users?%24filter=display_name%20eq%20%27John%20Doe%27")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    TestRequest::get("/api/security/users?%24filter=password%20eq%20%27x%27")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn admin_user_lifecycle() {
    let fixture = Fixture::new(LONG);
    let service = fixture.http();

    let created = TestRequest::post("/api/security/users")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .json(&json!({
            "id": "carol",
            "display_name": "Carol",
            "password": "carol-password",
            "role_ids": ["editors"]
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(created["directory_account"], false);

    TestRequest::post("/api/security/users")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .json(&json!({ "id": "carol", "display_name": "Carol again" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT);

    let whoami = TestRequest::get("/api/app/whoami")
        .basic_auth("carol", "carol-password")
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(whoami["role_ids"].as_array().expect("roles").contains(&json!("readers")));

    TestRequest::put("/api/security/users/carol")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .json(&json!({ "id": "ignored", "display_name": "Carol C." }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    let fetched = TestRequest::get("/api/security/users/carol")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(fetched["display_name"], "Carol C.");

    TestRequest::delete("/api/security/users/carol")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    TestRequest::get("/api/security/users/carol")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn admin_role_update_changes_expansion() {
    let fixture = Fixture::new(LONG);
    let service = fixture.http();

    TestRequest::put("/api/security/roles/writers")
        .basic_auth(ADMIN_USER, ADMIN_PASSWORD)
        .json(&json!({ "id": "writers", "role_ids": ["A"] }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let whoami = TestRequest::get("/api/app/whoami")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let roles = whoami["role_ids"].as_array().expect("roles");
    assert!(roles.contains(&json!("C")));
    assert!(!roles.contains(&json!("readers")));
}

#[test_log::test(tokio::test)]
async fn users_change_their_own_password() {
    let fixture = Fixture::new(LONG);
    let service = fixture.http();

    TestRequest::get("/api/app/whoami")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::post("/api/security/users/jdoe/password")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .json(&json!({ "old_password": JDOE_PASSWORD, "new_password": "fresh-password" }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::get("/api/app/whoami")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    TestRequest::get("/api/app/whoami")
        .basic_auth("jdoe", "fresh-password")
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn password_change_rules_over_http() {
    let fixture = Fixture::new(LONG);
    let service = fixture.http();

    TestRequest::post("/api/security/users/jdoe/password")
        .basic_auth("reader", READER_PASSWORD)
        .json(&json!({ "old_password": JDOE_PASSWORD, "new_password": "fresh-password" }))
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let refused = TestRequest::post("/api/security/users/jdoe/password")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .json(&json!({ "old_password": "not-it", "new_password": "fresh-password" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert!(refused.body.contains("CAN_NOT_CHANGE_PASSWORD"));

    let malformed = TestRequest::post("/api/security/users/jdoe/password")
        .basic_auth("jdoe", JDOE_PASSWORD)
        .json(&json!({ "old_password": JDOE_PASSWORD, "new_password": "short" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert!(malformed.body.contains("INVALID_PASSWORD_FORMAT"));

    TestRequest::post("/api/security/users/jdoe/password")
        .json(&json!({ "old_password": JDOE_PASSWORD, "new_password": "fresh-password" }))
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
