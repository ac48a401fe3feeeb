use serde::Deserialize;

use crate::auth::policy::PasswordPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Which credential store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Flat JSON file on disk.
    File,
    /// In-memory store for demo mode and tests. Nothing survives a restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_file: String,
    pub store: StoreBackend,
    pub jwt: JwtConfig,
    pub password_policy: PasswordPolicy,
    /// Explicit admin provisioning password. When unset, no admin is seeded.
    pub bootstrap_admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "libraryhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "libraryhub-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let store = match std::env::var("STORE").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            _ => StoreBackend::File,
        };
        let password_policy = match std::env::var("PASSWORD_POLICY").as_deref() {
            Ok("basic") => PasswordPolicy::Basic,
            _ => PasswordPolicy::Strong,
        };
        Ok(Self {
            data_file: std::env::var("DATA_FILE").unwrap_or_else(|_| "data/users.json".into()),
            store,
            jwt,
            password_policy,
            bootstrap_admin_password: std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        })
    }
}
