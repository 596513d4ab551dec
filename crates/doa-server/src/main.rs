mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use doa_scraper::{
    BrowserSession, CampaignScraper, ChromeLauncher, ChromeRenderer, FollowerCountService,
    PageOptions,
};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(doa_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = doa_db::PoolConfig::from_app_config(&config);
    let pool = doa_db::connect_pool(&config.database_url, pool_config).await?;
    doa_db::run_migrations(&pool).await?;

    let session = Arc::new(BrowserSession::new(
        ChromeLauncher::from_app_config(&config),
        config.build_phase,
    ));
    let renderer = ChromeRenderer::new(Arc::clone(&session), PageOptions::from_app_config(&config));
    let followers = Arc::new(FollowerCountService::new(renderer));
    let campaigns = Arc::new(CampaignScraper::from_app_config(&config)?);

    let _scheduler =
        scheduler::build_scheduler(pool.clone(), Arc::clone(&config), followers).await?;

    let app = build_app(AppState { pool, campaigns }, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "doa-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session.close_browser().await;
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
