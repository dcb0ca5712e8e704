use anyhow::Context;

use planboard_api::{app, config::ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    planboard_observability::init();

    let config = ApiConfig::from_env()?;
    let lookup = app::services::build_lookup(config.database_url.as_deref()).await?;
    let router = app::build_app(config.jwt_secret, lookup);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}
