use color_eyre::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use podium::{models, router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new()?;
    let database = sea_orm::Database::connect(config.database_url.as_str()).await?;
    models::create_tables(&database).await?;

    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = AppState::new(config, database)?;
    let app = router(state).layer(TraceLayer::new_for_http());

    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
