use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use promptgate::config::AppConfig;
use promptgate::state::AppState;
use promptgate::upstream::{GeminiModel, HttpScanGateway};
use promptgate::{database, seed};

fn init_logging() {
    // Default to `info` with the ORM's per-query noise turned down.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;

    let scanner = Arc::new(HttpScanGateway::new(&config.scanner)?);
    let model = Arc::new(GeminiModel::new(&config.model)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config,
        scanner,
        model,
    };
    let app = promptgate::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
