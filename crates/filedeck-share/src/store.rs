//! JSON-file-backed share registry.
//!
//! Shares live in memory in a concurrent map keyed by token; every
//! mutation is persisted by rewriting `shares.json` atomically (temp file
//! + rename), the same scheme the user store uses.

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use filedeck_auth::User;
use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

use crate::model::ShareLink;
use crate::token::generate_token;

/// Persistence record. Unlike [`ShareLink`], the password hash is
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredShare {
    token: String,
    path: String,
    password_hash: Option<String>,
    expires_at: DateTime<Utc>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl From<&ShareLink> for StoredShare {
    fn from(share: &ShareLink) -> Self {
        Self {
            token: share.token.clone(),
            path: share.path.clone(),
            password_hash: share.password_hash.clone(),
            expires_at: share.expires_at,
            created_by: share.created_by.clone(),
            created_at: share.created_at,
        }
    }
}

impl From<StoredShare> for ShareLink {
    fn from(stored: StoredShare) -> Self {
        Self {
            token: stored.token,
            path: stored.path,
            password_hash: stored.password_hash,
            expires_at: stored.expires_at,
            created_by: stored.created_by,
            created_at: stored.created_at,
        }
    }
}

/// Concurrent share registry persisted to a JSON file.
#[derive(Debug)]
pub struct ShareStore {
    /// Path of `shares.json`.
    path: PathBuf,
    /// All shares keyed by token.
    shares: DashMap<String, ShareLink>,
    /// Serializes file rewrites; map access stays lock-free.
    persist_lock: Mutex<()>,
}

impl ShareStore {
    /// Loads the registry from `path`. A missing file yields an empty one.
    pub async fn load(path: PathBuf) -> AppResult<Self> {
        let shares = DashMap::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let stored: Vec<StoredShare> = serde_json::from_slice(&bytes)?;
                for record in stored {
                    shares.insert(record.token.clone(), ShareLink::from(record));
                }
                tracing::debug!(path = %path.display(), count = shares.len(), "Loaded share registry");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No share file yet, starting empty");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            shares,
            persist_lock: Mutex::new(()),
        })
    }

    /// Creates a share for an already-resolved path. Token insertion is
    /// atomic; a colliding token is regenerated rather than raced.
    pub async fn create(
        &self,
        path: &str,
        password_hash: Option<String>,
        expires_in: i64,
        created_by: &str,
    ) -> AppResult<ShareLink> {
        if expires_in < 1 {
            return Err(AppError::validation(
                "expires_in must be at least 1 second",
            ));
        }
        let ttl = TimeDelta::try_seconds(expires_in)
            .ok_or_else(|| AppError::validation("expires_in is out of range"))?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::validation("expires_in is out of range"))?;
        // second precision keeps the wire format stable across rewrites
        let expires_at = expires_at.with_nanosecond(0).unwrap_or(expires_at);

        let share = loop {
            let token = generate_token();
            match self.shares.entry(token.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let share = ShareLink {
                        token,
                        path: path.to_string(),
                        password_hash: password_hash.clone(),
                        expires_at,
                        created_by: created_by.to_string(),
                        created_at: Utc::now(),
                    };
                    slot.insert(share.clone());
                    break share;
                }
            }
        };

        self.persist().await?;
        tracing::info!(
            path = %share.path,
            created_by = %share.created_by,
            expires_at = %share.expires_at,
            "Created share link"
        );
        Ok(share)
    }

    /// Looks up a share by token, expired or not.
    pub fn get(&self, token: &str) -> Option<ShareLink> {
        self.shares.get(token).map(|s| s.clone())
    }

    /// Revokes a share. The owner or an admin may delete; everyone else is
    /// rejected without revealing anything beyond existence.
    pub async fn delete(&self, token: &str, requester: &User) -> AppResult<ShareLink> {
        let share = self
            .get(token)
            .ok_or_else(|| AppError::not_found("Share not found"))?;

        if !share.deletable_by(&requester.username, requester.role.is_admin()) {
            return Err(AppError::forbidden("You can only delete your own shares"));
        }

        self.shares.remove(token);
        self.persist().await?;
        tracing::info!(path = %share.path, deleted_by = %requester.username, "Deleted share link");
        Ok(share)
    }

    /// Shares visible to `requester`: admins see all, others their own.
    pub fn list_for(&self, requester: &User) -> Vec<ShareLink> {
        let mut shares: Vec<ShareLink> = self
            .shares
            .iter()
            .filter(|s| requester.role.is_admin() || s.created_by == requester.username)
            .map(|s| s.clone())
            .collect();
        shares.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.token.cmp(&b.token)));
        shares
    }

    /// Rewrites the backing file from the current in-memory state.
    async fn persist(&self) -> AppResult<()> {
        let _guard = self.persist_lock.lock().await;

        let mut snapshot: Vec<StoredShare> = self
            .shares
            .iter()
            .map(|s| StoredShare::from(s.value()))
            .collect();
        snapshot.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.token.cmp(&b.token)));

        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
