use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use tracing::warn;

use crate::auth::password::SaltedHasher;
use crate::config::AppConfig;
use crate::users::services::ProfileService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub profiles: ProfileService,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let hasher = Arc::new(SaltedHasher::new(config.password_salt.clone()));
        Self::from_parts(config, hasher)
    }

    pub fn from_parts(config: AppConfig, hasher: Arc<SaltedHasher>) -> anyhow::Result<Self> {
        if config.admin.uses_default_password() {
            warn!(username = %config.admin.username, "administrator uses the default password");
        }
        let profiles =
            ProfileService::bootstrap(&config.admin, hasher).context("seed administrator")?;
        Ok(Self {
            config: Arc::new(config),
            profiles,
        })
    }

    /// State with administrator `admin`/`secret` and cheap hashing.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{AdminConfig, LogConfig, ServerConfig};
        use std::time::Duration;

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                read_timeout: Duration::from_secs(5),
                write_timeout: Duration::from_secs(5),
                idle_timeout: Duration::from_secs(5),
            },
            admin: AdminConfig {
                username: "admin".into(),
                password: "secret".into(),
                email: "admin@x.com".into(),
            },
            password_salt: "test-salt".into(),
            log: LogConfig {
                filter: "debug".into(),
                json: false,
            },
        };
        let hasher = Arc::new(SaltedHasher::for_tests(&config.password_salt));
        Self::from_parts(config, hasher).expect("fake state")
    }
}

impl FromRef<AppState> for ProfileService {
    fn from_ref(state: &AppState) -> Self {
        state.profiles.clone()
    }
}
