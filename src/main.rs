use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use admitdesk::admitdesk_config::AppConfig;
use admitdesk::admitdesk_rbac::{FEATURE_MIN_ROLE, validate_min_role_table};
use admitdesk::logging::init_tracing;
use admitdesk::router::init_router;
use admitdesk::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.server.log_dir).context("Failed to initialize logging")?;

    if let Err(err) = validate_min_role_table(FEATURE_MIN_ROLE) {
        error!(error = %err, "Minimum-role table is incomplete");
        return Err(err).context("Invalid minimum-role table");
    }

    let state = init_app_state(&config).await;
    let _sweeper = state.sessions.spawn_sweeper(config.session.sweep_interval);
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;

    info!(addr = %config.server.addr, "Server running");
    println!("🚀 Server running on http://{}", config.server.addr);
    println!("📚 Swagger UI available at http://{}/swagger-ui", config.server.addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
