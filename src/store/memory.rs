use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{NewUser, ProfileUpdate, StoreError, User, UserSet, UserStore};

/// In-memory credential store. Backs demo mode (no data file configured on
/// purpose) and the test suite; shares the invariant logic with the file
/// store through `UserSet`.
#[derive(Default)]
pub struct MemoryStore {
    set: RwLock<UserSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.set.read().await.find_by_username(username))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.set.read().await.find_by_id(id))
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        self.set.write().await.insert(new)
    }

    async fn update(&self, id: u64, patch: ProfileUpdate) -> Result<User, StoreError> {
        self.set.write().await.update(id, patch)
    }

    async fn set_password_hash(&self, id: u64, hash: &str) -> Result<(), StoreError> {
        self.set.write().await.set_password_hash(id, hash)
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.set.write().await.delete(id)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.set.read().await.users.clone())
    }
}
