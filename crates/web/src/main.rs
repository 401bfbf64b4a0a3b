use anyhow::Context;

use mesopotamia_infra::Settings;
use mesopotamia_web::app::{build_app, build_services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    mesopotamia_observability::init(settings.as_ref().is_ok_and(|s| s.server.debug));

    let settings = settings
        .inspect_err(|e| tracing::error!(error = %e, "invalid configuration; refusing to start"))?;

    if settings.recipient.is_none() {
        tracing::warn!("RECIPIENT_EMAIL is not set; contact submissions will not be delivered");
    }

    let services = build_services(&settings).await?;
    let app = build_app(services);

    let bind_addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
