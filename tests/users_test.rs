//! Admin user management tests.

mod helpers;

use axum::http::StatusCode;
use helpers::{TestApp, form};

#[tokio::test]
async fn admin_manages_the_full_user_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let body = form(&[
        ("username", "bob"),
        ("password", "bobpass1"),
        ("role", "standard"),
    ]);
    let created = app
        .request("POST", "/api/users", Some(body), Some(&admin))
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["username"], "bob");
    assert_eq!(created.body["role"], "standard");
    assert!(!created.body["created_at"].is_null());
    // Never leak credential material.
    assert!(created.body.get("password_hash").is_none());

    let listed = app.request("GET", "/api/users", None, Some(&admin)).await;
    let names: Vec<&str> = listed.body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin", "bob"]);

    app.login("bob", "bobpass1").await;

    let changes = form(&[("role", "power"), ("password", "newpass99")]);
    let updated = app
        .request("PUT", "/api/users/bob", Some(changes), Some(&admin))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["role"], "power");

    let old_password = form(&[("username", "bob"), ("password", "bobpass1")]);
    let stale = app
        .request("POST", "/api/login", Some(old_password), None)
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let fresh = app.login("bob", "newpass99").await;
    let profile = app
        .request("GET", "/api/user/profile", None, Some(&fresh))
        .await;
    assert_eq!(profile.body["role"], "power");

    let deleted = app
        .request("DELETE", "/api/users/bob", None, Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["deleted"], "bob");

    let gone = form(&[("username", "bob"), ("password", "newpass99")]);
    let refused = app.request("POST", "/api/login", Some(gone), None).await;
    assert_eq!(refused.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_user("bob", "bobpass1", "standard").await;

    let body = form(&[
        ("username", "bob"),
        ("password", "otherpw1"),
        ("role", "power"),
    ]);
    let response = app
        .request("POST", "/api/users", Some(body), Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["detail"], "User 'bob' already exists");
}

#[tokio::test]
async fn only_admins_manage_users() {
    let app = TestApp::new().await;
    app.create_user("op", "operator1", "power").await;
    let token = app.login("op", "operator1").await;

    let listed = app.request("GET", "/api/users", None, Some(&token)).await;
    assert_eq!(listed.status, StatusCode::FORBIDDEN);

    let body = form(&[
        ("username", "mole"),
        ("password", "molepass"),
        ("role", "admin"),
    ]);
    let created = app
        .request("POST", "/api/users", Some(body), Some(&token))
        .await;
    assert_eq!(created.status, StatusCode::FORBIDDEN);

    let deleted = app
        .request("DELETE", "/api/users/admin", None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_roles_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let body = form(&[
        ("username", "eve"),
        ("password", "evepass1"),
        ("role", "superadmin"),
    ]);
    let response = app
        .request("POST", "/api/users", Some(body), Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let body = form(&[
        ("username", "eve"),
        ("password", "abc"),
        ("role", "standard"),
    ]);
    let created = app
        .request("POST", "/api/users", Some(body), Some(&admin))
        .await;
    assert_eq!(created.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        created.body["detail"],
        "Password must be at least 4 characters"
    );

    app.create_user("eve", "evepass1", "standard").await;
    let changes = form(&[("password", "ab")]);
    let updated = app
        .request("PUT", "/api/users/eve", Some(changes), Some(&admin))
        .await;
    assert_eq!(updated.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let response = app
        .request("DELETE", "/api/users/admin", None, Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["detail"], "You cannot delete your own account");
}

#[tokio::test]
async fn updating_a_missing_user_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let changes = form(&[("role", "power")]);
    let response = app
        .request("PUT", "/api/users/ghost", Some(changes), Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["detail"], "User 'ghost' not found");
}

#[tokio::test]
async fn role_changes_take_effect_on_the_next_request() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_user("flip", "flippass", "power").await;
    let token = app.login("flip", "flippass").await;

    // Power may delete.
    let allowed = app
        .request("DELETE", "/api/file?path=notes.txt", None, Some(&token))
        .await;
    assert_eq!(allowed.status, StatusCode::OK);

    let demote = form(&[("role", "readonly")]);
    app.request("PUT", "/api/users/flip", Some(demote), Some(&admin))
        .await;

    // Same token, but the stored role now wins.
    let refused = app
        .request("DELETE", "/api/file?path=docs/guide.md", None, Some(&token))
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
}
