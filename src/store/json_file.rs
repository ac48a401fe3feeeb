use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{NewUser, ProfileUpdate, StoreError, User, UserSet, UserStore};

/// Flat-JSON-file credential store. The whole record set is held in memory
/// and rewritten on every mutation; mutations run under a single write lock,
/// so concurrent writers cannot lose each other's updates. Writes go to a
/// temp file first and are renamed into place.
pub struct JsonFileStore {
    path: PathBuf,
    set: RwLock<UserSet>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let set = Self::load(&path).await?;
        info!(path = %path.display(), users = set.users.len(), "user store opened");
        Ok(Self {
            path,
            set: RwLock::new(set),
        })
    }

    async fn load(path: &Path) -> anyhow::Result<UserSet> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UserSet::default());
            }
            Err(e) => return Err(e).context("read user store file"),
        };
        match serde_json::from_slice::<UserSet>(&raw) {
            Ok(set) => Ok(set),
            // Older files are a bare record array with no id counter.
            Err(_) => {
                let users: Vec<User> =
                    serde_json::from_slice(&raw).context("parse user store file")?;
                warn!(
                    path = %path.display(),
                    "legacy user store format detected, migrating"
                );
                Ok(UserSet::from_users(users))
            }
        }
    }

    /// Serializes the set and swaps it into place. Called with the write lock
    /// held, so persisted state always matches what callers observed.
    async fn persist(&self, set: &UserSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("create data directory")
                .map_err(StoreError::Io)?;
        }
        let raw = serde_json::to_vec_pretty(set)
            .context("serialize user store")
            .map_err(StoreError::Io)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .context("write user store temp file")
            .map_err(StoreError::Io)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context("replace user store file")
            .map_err(StoreError::Io)?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.set.read().await.find_by_username(username))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.set.read().await.find_by_id(id))
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut set = self.set.write().await;
        let user = set.insert(new)?;
        self.persist(&set).await?;
        Ok(user)
    }

    async fn update(&self, id: u64, patch: ProfileUpdate) -> Result<User, StoreError> {
        let mut set = self.set.write().await;
        let user = set.update(id, patch)?;
        self.persist(&set).await?;
        Ok(user)
    }

    async fn set_password_hash(&self, id: u64, hash: &str) -> Result<(), StoreError> {
        let mut set = self.set.write().await;
        set.set_password_hash(id, hash)?;
        self.persist(&set).await
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut set = self.set.write().await;
        set.delete(id)?;
        self.persist(&set).await
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.set.read().await.users.clone())
    }
}
