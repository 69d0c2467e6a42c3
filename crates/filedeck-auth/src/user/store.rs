//! JSON-file-backed user store.
//!
//! All accounts live in memory in a concurrent map; every mutation is
//! persisted by rewriting `users.json` atomically (temp file + rename).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

use super::model::{CreateUser, UpdateUser, User};
use super::role::UserRole;

/// Persistence record. Unlike [`User`], the password hash is serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    username: String,
    password_hash: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl From<&User> for StoredUser {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        Self {
            username: stored.username,
            password_hash: stored.password_hash,
            role: stored.role,
            created_at: stored.created_at,
        }
    }
}

/// Concurrent user store persisted to a JSON file.
#[derive(Debug)]
pub struct UserStore {
    /// Path of `users.json`.
    path: PathBuf,
    /// All accounts keyed by username.
    users: DashMap<String, User>,
    /// Serializes file rewrites; map access stays lock-free.
    persist_lock: Mutex<()>,
}

impl UserStore {
    /// Loads the store from `path`. A missing file yields an empty store.
    pub async fn load(path: PathBuf) -> AppResult<Self> {
        let users = DashMap::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let stored: Vec<StoredUser> = serde_json::from_slice(&bytes)?;
                for record in stored {
                    users.insert(record.username.clone(), User::from(record));
                }
                tracing::debug!(path = %path.display(), count = users.len(), "Loaded user store");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No user file yet, starting empty");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            users,
            persist_lock: Mutex::new(()),
        })
    }

    /// Creates the bootstrap admin account if no such user exists.
    pub async fn ensure_admin(&self, username: &str, password_hash: String) -> AppResult<()> {
        if self.users.contains_key(username) {
            return Ok(());
        }
        self.create(CreateUser {
            username: username.to_string(),
            password_hash,
            role: UserRole::Admin,
        })
        .await?;
        tracing::info!(username = %username, "Created bootstrap admin user");
        Ok(())
    }

    /// Creates a new user. Fails with `Conflict` if the username is taken.
    pub async fn create(&self, data: CreateUser) -> AppResult<User> {
        let user = User {
            username: data.username.clone(),
            password_hash: data.password_hash,
            role: data.role,
            created_at: Utc::now(),
        };

        match self.users.entry(data.username.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(format!(
                    "User '{}' already exists",
                    data.username
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
            }
        }

        self.persist().await?;
        Ok(user)
    }

    /// Looks up a user by username.
    pub fn get(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|u| u.clone())
    }

    /// Returns all users sorted by username.
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Applies the given changes to an existing user.
    pub async fn update(&self, username: &str, changes: UpdateUser) -> AppResult<User> {
        let updated = {
            let mut entry = self
                .users
                .get_mut(username)
                .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;

            if let Some(role) = changes.role {
                entry.role = role;
            }
            if let Some(hash) = changes.password_hash {
                entry.password_hash = hash;
            }
            entry.clone()
        };

        self.persist().await?;
        Ok(updated)
    }

    /// Removes a user. Fails with `NotFound` for unknown usernames.
    pub async fn delete(&self, username: &str) -> AppResult<()> {
        if self.users.remove(username).is_none() {
            return Err(AppError::not_found(format!("User '{username}' not found")));
        }
        self.persist().await?;
        Ok(())
    }

    /// Rewrites the backing file from the current in-memory state.
    async fn persist(&self) -> AppResult<()> {
        let _guard = self.persist_lock.lock().await;

        let mut snapshot: Vec<StoredUser> =
            self.users.iter().map(|e| StoredUser::from(e.value())).collect();
        snapshot.sort_by(|a, b| a.username.cmp(&b.username));

        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
