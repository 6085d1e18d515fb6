mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AuthState, RateLimitState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = kirana_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let profiles = match &config.store_profiles_path {
        Some(path) => kirana_core::load_store_profiles(path)?,
        None => kirana_core::StoreProfiles::builtin(),
    };

    let pool_config = kirana_db::PoolConfig::from_app_config(&config);
    let pool = kirana_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = kirana_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    std::fs::create_dir_all(&config.upload_dir)?;

    let auth = AuthState::from_env(
        matches!(config.env, kirana_core::Environment::Development),
        &config.api_key_hash_salt,
    )?;
    let state = AppState {
        pool,
        profiles: Arc::new(profiles),
        upload_dir: config.upload_dir.clone(),
        upload_max_bytes: config.upload_max_bytes,
    };
    let app = build_app(state, auth, RateLimitState::from_app_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "kirana-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
