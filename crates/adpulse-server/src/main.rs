use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use adpulse_core::source::MockAdManager;
use adpulse_server::{config::Config, state::AppState};

/// `adpulse health` — liveness check for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$ADPULSE_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("ADPULSE_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adpulse=info".parse()?)
                .add_directive("adpulse_server=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // The upstream ad network is mocked; swap in a real `ReportingSource` here.
    let state = Arc::new(AppState::new(MockAdManager::new(), cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = adpulse_server::app::build_app(state);

    info!(
        port = cfg.port,
        default_window_days = cfg.default_window_days,
        "adpulse listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
