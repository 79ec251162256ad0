use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_ADMIN_PASSWORD: &str = "qwerty";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Administrator seeded into a fresh store.
#[derive(Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AdminConfig {
    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_ADMIN_PASSWORD
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub filter: String,
    pub json: bool,
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub password_salt: String,
    pub log: LogConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("server", &self.server)
            .field("admin", &self.admin)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let secs = |key: &str, default: u64| -> anyhow::Result<Duration> {
            match var(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{key} must be a whole number of seconds")),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let server = ServerConfig {
            host: or("APP_HOST", "0.0.0.0"),
            port: or("APP_PORT", "8080")
                .trim()
                .parse()
                .context("APP_PORT must be a port number")?,
            read_timeout: secs("APP_READ_TIMEOUT_SECS", 10)?,
            write_timeout: secs("APP_WRITE_TIMEOUT_SECS", 10)?,
            idle_timeout: secs("APP_IDLE_TIMEOUT_SECS", 10)?,
        };
        let admin = AdminConfig {
            username: or("ADMIN_USERNAME", "Admin"),
            password: or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
            email: or("ADMIN_EMAIL", "qwerty@email.com"),
        };
        let log = LogConfig {
            filter: var("LOG_LEVEL")
                .or_else(|| var("RUST_LOG"))
                .unwrap_or_else(|| "profiles=debug,tower_http=info".to_string()),
            json: var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
        };

        Ok(Self {
            server,
            admin,
            password_salt: or("PASSWORD_SALT", "MyUniqueSalt"),
            log,
        })
    }
}
