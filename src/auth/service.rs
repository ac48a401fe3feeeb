use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, UpdateProfileRequest},
        jwt::{Claims, TokenKeys},
        password::{hash_password, verify_stored, VerifyOutcome},
        policy::{is_valid_email, PasswordPolicy},
    },
    errors::ApiError,
    store::{NewUser, ProfileUpdate, Role, User, UserStore},
};

/// Orchestrates registration, login and account management against the
/// credential store. The store backend (file or in-memory) is behind the
/// trait object, so demo mode runs the exact same flows.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    policy: PasswordPolicy,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, policy: PasswordPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, ApiError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_lowercase();

        if username.is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(ApiError::Validation("All fields are required".into()));
        }
        if !is_valid_email(&email) {
            return Err(ApiError::Validation(
                "Please enter a valid email address".into(),
            ));
        }
        self.policy
            .check(&req.password)
            .map_err(ApiError::Validation)?;

        let password_hash = hash_password(&req.password)?;
        let user = self
            .store
            .insert(NewUser {
                username,
                email,
                password_hash,
                role: Role::Member,
                name: None,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    pub async fn login(
        &self,
        req: &LoginRequest,
        keys: &TokenKeys,
    ) -> Result<(String, User), ApiError> {
        if req.username.is_empty() || req.password.is_empty() {
            return Err(ApiError::Validation(
                "Username and password are required".into(),
            ));
        }

        let user = self
            .store
            .find_by_username(&req.username)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".into()))?;

        match verify_stored(&req.password, &user.password_hash)? {
            VerifyOutcome::Mismatch => {
                warn!(username = %req.username, "login invalid password");
                return Err(ApiError::Unauthorized(
                    "Invalid username or password".into(),
                ));
            }
            VerifyOutcome::Match { needs_rehash } => {
                if needs_rehash {
                    // One-time migration of a legacy plaintext value.
                    let upgraded = hash_password(&req.password)?;
                    self.store.set_password_hash(user.id, &upgraded).await?;
                    info!(user_id = %user.id, "legacy password upgraded to hash");
                }
            }
        }

        let token = keys.sign(user.id, &user.username, user.role)?;
        info!(user_id = %user.id, username = %user.username, "user logged in");
        Ok((token, user))
    }

    pub async fn update_profile(
        &self,
        actor: &Claims,
        target_id: u64,
        req: UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        if actor.sub != target_id && !actor.is_admin() {
            return Err(ApiError::Forbidden(
                "You can only update your own profile".into(),
            ));
        }
        let email = match req.email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                if !is_valid_email(&email) {
                    return Err(ApiError::Validation(
                        "Please enter a valid email address".into(),
                    ));
                }
                Some(email)
            }
            None => None,
        };
        let user = self
            .store
            .update(
                target_id,
                ProfileUpdate {
                    name: req.name,
                    email,
                    avatar: req.avatar,
                },
            )
            .await?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get_user(&self, id: u64) -> Result<User, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    }

    pub async fn delete_user(&self, actor: &Claims, id: u64) -> Result<(), ApiError> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden(
                "Only an administrator can delete accounts".into(),
            ));
        }
        self.store.delete(id).await?;
        info!(user_id = %id, deleted_by = %actor.sub, "user deleted");
        Ok(())
    }

    /// Seeds the admin account on an empty store, but only when an explicit
    /// provisioning password was configured. There is no built-in default
    /// credential.
    pub async fn bootstrap(&self, admin_password: Option<&str>) -> anyhow::Result<()> {
        if !self.store.list_all().await?.is_empty() {
            return Ok(());
        }
        let Some(password) = admin_password else {
            warn!("store is empty and no BOOTSTRAP_ADMIN_PASSWORD set; no admin account seeded");
            return Ok(());
        };
        let password_hash = hash_password(password)?;
        let admin = self
            .store
            .insert(NewUser {
                username: "admin".into(),
                email: "admin@library.com".into(),
                password_hash,
                role: Role::Admin,
                name: Some("Admin User".into()),
            })
            .await
            .map_err(anyhow::Error::from)?;
        info!(user_id = %admin.id, "admin account provisioned");
        Ok(())
    }
}
