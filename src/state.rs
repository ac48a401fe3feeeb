use std::sync::Arc;

use crate::auth::service::AuthService;
use crate::config::{AppConfig, StoreBackend};
use crate::store::{JsonFileStore, MemoryStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store: Arc<dyn UserStore> = match config.store {
            StoreBackend::File => Arc::new(JsonFileStore::open(&config.data_file).await?),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        let auth = AuthService::new(store, config.password_policy);
        Ok(Self { auth, config })
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        let auth = AuthService::new(store, config.password_policy);
        Self { auth, config }
    }

    /// In-memory state with fixed JWT settings, for tests.
    pub fn fake() -> Self {
        use crate::auth::policy::PasswordPolicy;
        use crate::config::JwtConfig;

        let config = Arc::new(AppConfig {
            data_file: "unused".into(),
            store: StoreBackend::Memory,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            password_policy: PasswordPolicy::Strong,
            bootstrap_admin_password: None,
        });
        Self::from_parts(Arc::new(MemoryStore::new()), config)
    }
}
