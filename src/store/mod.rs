use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// User role. The original data files carried `"user"` for self-registered
/// accounts before settling on `"member"`; accept both on read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "user")]
    Member,
}

/// User record as persisted. Field names stay camelCase so existing
/// `users.json` files remain readable. The hash is serialized here (the file
/// store needs it on disk); API responses go through `PublicUser` instead,
/// which never carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Fields supplied when creating a record; id and timestamp are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: Option<String>,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// Credential store contract. Implementations serialize mutations internally,
/// so a read-modify-write cycle is atomic from the caller's perspective.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup, as used by login.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError>;
    /// Assigns the next id, stamps `member_since` and enforces uniqueness.
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;
    /// Applies the present subset of `ProfileUpdate`, re-checking email
    /// uniqueness when the email changes.
    async fn update(&self, id: u64, patch: ProfileUpdate) -> Result<User, StoreError>;
    /// Replaces the stored hash, used when upgrading a legacy plaintext value.
    async fn set_password_hash(&self, id: u64, hash: &str) -> Result<(), StoreError>;
    async fn delete(&self, id: u64) -> Result<(), StoreError>;
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

fn default_next_id() -> u64 {
    1
}

/// The record set plus its id high-water mark. Both store backends guard one
/// of these behind a write lock; ids are assigned from `next_id` and never
/// handed out twice, even after deletions.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UserSet {
    #[serde(default = "default_next_id")]
    pub next_id: u64,
    pub users: Vec<User>,
}

impl Default for UserSet {
    fn default() -> Self {
        Self {
            next_id: 1,
            users: Vec::new(),
        }
    }
}

impl UserSet {
    /// Builds a set from a bare record list (the legacy on-disk format, which
    /// had no id counter). The high-water mark is seeded past the largest id.
    pub fn from_users(users: Vec<User>) -> Self {
        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        Self { next_id, users }
    }

    fn check_unique(&self, username: &str, email: &str, skip_id: Option<u64>) -> Result<(), StoreError> {
        for u in &self.users {
            if Some(u.id) == skip_id {
                continue;
            }
            if u.username.eq_ignore_ascii_case(username) {
                return Err(StoreError::Conflict("Username already exists".into()));
            }
            if u.email.eq_ignore_ascii_case(email) {
                return Err(StoreError::Conflict("Email already exists".into()));
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, new: NewUser) -> Result<User, StoreError> {
        self.check_unique(&new.username, &new.email, None)?;
        let user = User {
            id: self.next_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            member_since: OffsetDateTime::now_utc(),
            name: new.name,
            avatar: None,
        };
        self.next_id += 1;
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn update(&mut self, id: u64, patch: ProfileUpdate) -> Result<User, StoreError> {
        let idx = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        if let Some(email) = &patch.email {
            // The scan skips the target itself, so keeping one's own email
            // never conflicts.
            for u in &self.users {
                if u.id != id && u.email.eq_ignore_ascii_case(email) {
                    return Err(StoreError::Conflict("Email already exists".into()));
                }
            }
        }
        let user = &mut self.users[idx];
        if let Some(name) = patch.name {
            user.name = Some(name);
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = Some(avatar);
        }
        Ok(user.clone())
    }

    pub fn set_password_hash(&mut self, id: u64, hash: &str) -> Result<(), StoreError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.password_hash = hash.to_string();
        Ok(())
    }

    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        if self.users.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.users.iter().find(|u| u.username == username).cloned()
    }

    pub fn find_by_id(&self, id: u64) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }
}
