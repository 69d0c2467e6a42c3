//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use filedeck_api::{AppState, build_app, build_state};
use filedeck_auth::user::model::CreateUser;
use filedeck_core::config::AppConfig;

/// Test application context: a full router over a temp scan root.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct store access in setup
    pub state: AppState,
    scan_root: TempDir,
    _data_dir: TempDir,
}

impl TestApp {
    /// Creates a test application over a small seeded directory tree:
    ///
    /// ```text
    /// docs/guide.md        8 bytes
    /// docs/api/readme.txt
    /// music/song.mp3
    /// notes.txt            8 bytes
    /// ```
    pub async fn new() -> Self {
        let scan_root = tempfile::tempdir().expect("scan root tempdir");
        let data_dir = tempfile::tempdir().expect("data tempdir");
        seed_tree(scan_root.path());

        let mut config = AppConfig::default();
        config.scan.root = scan_root.path().to_string_lossy().into_owned();
        config.storage.data_dir = data_dir
            .path()
            .join("state")
            .to_string_lossy()
            .into_owned();

        let state = build_state(config).await.expect("state should build");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            scan_root,
            _data_dir: data_dir,
        }
    }

    /// Absolute path of the seeded scan root.
    pub fn root(&self) -> &Path {
        self.scan_root.path()
    }

    /// Creates a user directly in the store.
    pub async fn create_user(&self, username: &str, password: &str, role: &str) {
        let hash = self
            .state
            .hasher
            .hash_password(password)
            .expect("hash password");
        self.state
            .users
            .create(CreateUser {
                username: username.to_string(),
                password_hash: hash,
                role: role.parse().expect("role"),
            })
            .await
            .expect("create user");
    }

    /// Logs in and returns the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = form(&[("username", username), ("password", password)]);
        let response = self.request("POST", "/api/login", Some(body), None).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body["access_token"]
            .as_str()
            .expect("access_token in login response")
            .to_string()
    }

    /// Logs in as the bootstrap admin.
    pub async fn login_admin(&self) -> String {
        self.login("admin", "admin").await
    }

    /// Triggers a root scan and waits for it to complete.
    pub async fn scan_and_wait(&self, token: &str) {
        let response = self.request("POST", "/api/scan", None, Some(token)).await;
        assert_eq!(
            response.status,
            StatusCode::ACCEPTED,
            "Scan trigger failed: {:?}",
            response.body
        );
        self.wait_for_scan().await;
    }

    /// Polls `/api/scan_status` until the scan reports done.
    pub async fn wait_for_scan(&self) {
        for _ in 0..500 {
            let status = self.request("GET", "/api/scan_status", None, None).await;
            if status.body["done"].as_bool() == Some(true) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("scan did not finish in time");
    }

    /// Creates a share via the API and returns its token.
    pub async fn create_share(&self, auth: &str, path: &str, password: Option<&str>) -> String {
        let mut uri = format!("/api/share?path={path}&expires_in=3600");
        if let Some(password) = password {
            uri.push_str(&format!("&password={password}"));
        }
        let response = self.request("POST", &uri, None, Some(auth)).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Share create failed: {:?}",
            response.body
        );
        response.body["token"]
            .as_str()
            .expect("token in share response")
            .to_string()
    }

    /// Makes an HTTP request; `body` is an already-encoded form string.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if body.is_some() {
            req = req.header("Content-Type", "application/x-www-form-urlencoded");
        }
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let req = req
            .body(Body::from(body.unwrap_or_default()))
            .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Raw request variant for downloads: returns headers and bytes.
    pub async fn request_bytes(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        token: Option<&str>,
    ) -> RawResponse {
        let mut req = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let req = req.body(Body::empty()).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .expect("read body")
            .to_vec();

        RawResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a JSON test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON body; `Null` when the body was not JSON.
    pub body: Value,
}

/// Response from a byte-stream test request.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

/// Encodes simple key/value pairs as a form body. Values must not need
/// percent-encoding.
pub fn form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn seed_tree(root: &Path) {
    std::fs::create_dir_all(root.join("docs/api")).expect("mkdir docs/api");
    std::fs::create_dir_all(root.join("music")).expect("mkdir music");
    std::fs::write(root.join("docs/guide.md"), "# guide\n").expect("guide.md");
    std::fs::write(root.join("docs/api/readme.txt"), "api readme").expect("readme.txt");
    std::fs::write(root.join("music/song.mp3"), vec![0u8; 2048]).expect("song.mp3");
    std::fs::write(root.join("notes.txt"), "top note").expect("notes.txt");
}
