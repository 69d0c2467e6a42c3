//! Login, token validation, and profile endpoint tests.

mod helpers;

use axum::http::StatusCode;
use helpers::{TestApp, form};

#[tokio::test]
async fn bootstrap_admin_can_log_in() {
    let app = TestApp::new().await;

    let body = form(&[("username", "admin"), ("password", "admin")]);
    let response = app.request("POST", "/api/login", Some(body), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(response.body["token_type"], "bearer");
    assert_eq!(response.body["user"]["username"], "admin");
    assert_eq!(response.body["user"]["role"], "admin");
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = TestApp::new().await;

    let wrong_password = form(&[("username", "admin"), ("password", "nope")]);
    let bad_pw = app
        .request("POST", "/api/login", Some(wrong_password), None)
        .await;

    let unknown_user = form(&[("username", "ghost"), ("password", "nope")]);
    let bad_user = app
        .request("POST", "/api/login", Some(unknown_user), None)
        .await;

    assert_eq!(bad_pw.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad_user.status, StatusCode::UNAUTHORIZED);
    // Unknown usernames must be indistinguishable from wrong passwords.
    assert_eq!(bad_pw.body["detail"], "Incorrect username or password");
    assert_eq!(bad_pw.body["detail"], bad_user.body["detail"]);
}

#[tokio::test]
async fn profile_reflects_the_authenticated_user() {
    let app = TestApp::new().await;
    app.create_user("erin", "hunter2", "power").await;
    let token = app.login("erin", "hunter2").await;

    let response = app
        .request("GET", "/api/user/profile", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "erin");
    assert_eq!(response.body["role"], "power");
}

#[tokio::test]
async fn missing_and_malformed_auth_headers_are_rejected() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/user/profile", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["detail"], "Missing Authorization header");

    let wrong_scheme = app
        .request_bytes(
            "GET",
            "/api/user/profile",
            &[("Authorization", "Basic YWRtaW46YWRtaW4=")],
            None,
        )
        .await;
    assert_eq!(wrong_scheme.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/api/user/profile", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_of_a_deleted_user_stops_working() {
    let app = TestApp::new().await;
    app.create_user("temp", "shortlived", "standard").await;
    let token = app.login("temp", "shortlived").await;
    let admin = app.login_admin().await;

    let deleted = app
        .request("DELETE", "/api/users/temp", None, Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    // The JWT is still validly signed, but the account is gone.
    let response = app
        .request("GET", "/api/user/profile", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["detail"], "User no longer exists");
}

#[tokio::test]
async fn ping_needs_no_auth() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/ping", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn browsing_requires_a_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/folder", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
