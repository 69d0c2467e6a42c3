//! Share access validation.
//!
//! Every share request passes through [`ShareAccess::resolve`]; a correct
//! password never elevates into any kind of session, so expiry and
//! revocation take effect on the very next request.

use std::sync::Arc;

use filedeck_auth::PasswordHasher;
use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

use crate::model::ShareLink;
use crate::store::ShareStore;

/// Unknown and expired tokens produce this same response, so a caller
/// cannot probe which tokens exist.
const INVALID_SHARE: &str = "Invalid or expired share link";
/// Only sent once the token itself is confirmed valid.
const BAD_PASSWORD: &str = "Password required or incorrect";

/// Token and password gate in front of the share registry.
#[derive(Debug)]
pub struct ShareAccess {
    store: Arc<ShareStore>,
    hasher: Arc<PasswordHasher>,
}

impl ShareAccess {
    pub fn new(store: Arc<ShareStore>, hasher: Arc<PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Validates a token and optional password, returning the live share.
    pub fn resolve(&self, token: &str, password: Option<&str>) -> AppResult<ShareLink> {
        let share = self
            .store
            .get(token)
            .ok_or_else(|| AppError::unauthorized(INVALID_SHARE))?;

        if share.is_expired() {
            return Err(AppError::unauthorized(INVALID_SHARE));
        }

        if let Some(hash) = &share.password_hash {
            let supplied = password.unwrap_or("");
            if supplied.is_empty() || !self.hasher.verify_password(supplied, hash)? {
                return Err(AppError::unauthorized(BAD_PASSWORD));
            }
        }

        Ok(share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedeck_core::error::ErrorKind;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<ShareStore>,
        access: ShareAccess,
    }

    /// Seeds the registry file directly so expired records can exist,
    /// which `create` correctly refuses to produce.
    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shares.json");
        let hasher = Arc::new(PasswordHasher::new());

        let seeded = serde_json::json!([{
            "token": "expired-token",
            "path": "old",
            "password_hash": null,
            "expires_at": "2020-01-01T00:00:00Z",
            "created_by": "alice",
            "created_at": "2019-12-31T00:00:00Z",
        }]);
        std::fs::write(&path, serde_json::to_vec_pretty(&seeded).unwrap()).unwrap();

        let store = Arc::new(ShareStore::load(path).await.unwrap());
        Fixture {
            _dir: dir,
            access: ShareAccess::new(Arc::clone(&store), hasher),
            store,
        }
    }

    #[tokio::test]
    async fn open_share_resolves_without_a_password() {
        let fx = fixture().await;
        let share = fx.store.create("docs", None, 3600, "alice").await.unwrap();

        let resolved = fx.access.resolve(&share.token, None).unwrap();
        assert_eq!(resolved.path, "docs");

        // a stray password on an open share is ignored
        assert!(fx.access.resolve(&share.token, Some("whatever")).is_ok());
    }

    #[tokio::test]
    async fn unknown_and_expired_tokens_are_indistinguishable() {
        let fx = fixture().await;

        let missing = fx.access.resolve("no-such-token", None).unwrap_err();
        let expired = fx.access.resolve("expired-token", None).unwrap_err();

        assert_eq!(missing.kind, ErrorKind::Unauthorized);
        assert_eq!(expired.kind, ErrorKind::Unauthorized);
        assert_eq!(missing.message, expired.message);
    }

    #[tokio::test]
    async fn password_gate_rejects_wrong_and_empty_passwords() {
        let fx = fixture().await;
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("open sesame").unwrap();
        let share = fx
            .store
            .create("docs", Some(hash), 3600, "alice")
            .await
            .unwrap();

        let wrong = fx.access.resolve(&share.token, Some("guess")).unwrap_err();
        assert_eq!(wrong.kind, ErrorKind::Unauthorized);

        let empty = fx.access.resolve(&share.token, None).unwrap_err();
        assert_eq!(empty.message, wrong.message);

        // the password prompt message differs from the invalid-token one
        let missing = fx.access.resolve("no-such-token", None).unwrap_err();
        assert_ne!(missing.message, wrong.message);

        let ok = fx.access.resolve(&share.token, Some("open sesame")).unwrap();
        assert!(ok.has_password());
    }
}
