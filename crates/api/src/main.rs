use anyhow::Context;

use vendorperf_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vendorperf_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = vendorperf_api::app::services::AppServices::from_backend(&config.store)
        .await
        .context("failed to initialise stores")?;

    let app = vendorperf_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
