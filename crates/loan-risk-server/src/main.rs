use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use loan_risk_core::scoring::ModelSet;
use loan_risk_server::config::ServerConfig;
use loan_risk_server::warehouse::{KeyPairCredential, SnowflakeSink};
use loan_risk_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    // No partial-service mode: every artifact and the key must load.
    let models = ModelSet::load(&config.artifacts.paths()).context("loading scoring artifacts")?;
    let credential = KeyPairCredential::load(&config.warehouse.private_key_path)
        .context("loading warehouse private key")?;
    let sink = SnowflakeSink::new(config.warehouse.clone(), &credential)
        .context("preparing warehouse credential")?;

    let state = AppState::new(Arc::new(models), Arc::new(sink));
    let app = create_router(state);

    info!(
        bind = %config.bind,
        account = %config.warehouse.account,
        table = %config.warehouse.table,
        "loan risk server starting"
    );

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
