mod app;
mod auth;
mod config;
mod error;
mod state;
mod users;

use crate::config::{AppConfig, LogConfig};
use crate::state::AppState;

fn init_tracing(log: &LogConfig) {
    if log.json {
        tracing_subscriber::fmt()
            .with_env_filter(log.filter.as_str())
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(log.filter.as_str()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config.log);
    tracing::debug!(?config, "configuration loaded");

    let state = AppState::init(config)?;
    let server_config = state.config.server.clone();
    let app = app::build_app(state);

    app::serve(app, &server_config).await
}
