use std::sync::Arc;

use prometheus::Encoder;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("tablekv starting...");

    let config_str = std::fs::read_to_string("config.toml")
        .unwrap_or_else(|_| include_str!("../default_config.toml").to_string());
    let config: tablekv::config::AppConfig = toml::from_str(&config_str)?;

    let store = Arc::new(tablekv::store::Store::open(config.store.clone())?);

    let metrics_addr = config.server.metrics_addr.parse()?;
    tokio::spawn(async move {
        start_metrics_server(metrics_addr).await;
    });

    let health_addr = config.server.health_addr.parse()?;
    tokio::spawn(async move {
        start_health_server(health_addr).await;
    });

    let api_addr: std::net::SocketAddr = config.server.api_addr.parse()?;
    let api_store = store.clone();
    let api_handle = tokio::spawn(async move {
        tablekv::api::start_api_server(api_addr, api_store).await;
    });

    let server_handle = tablekv::server::ServerHandle { api_handle, store };

    info!("tablekv ready to accept connections");
    info!("API: http://{}", config.server.api_addr);
    info!("Metrics: http://{}/metrics", config.server.metrics_addr);
    info!("Health: http://{}/health", config.server.health_addr);

    server_handle.wait_for_shutdown().await;

    Ok(())
}

async fn start_metrics_server(addr: std::net::SocketAddr) {
    let app = axum::Router::new().route("/metrics", axum::routing::get(metrics_handler));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind metrics address");
    axum::serve(listener, app).await.expect("metrics server failed");
}

async fn metrics_handler() -> String {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

async fn start_health_server(addr: std::net::SocketAddr) {
    let app = axum::Router::new().route("/health", axum::routing::get(health_handler));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind health address");
    axum::serve(listener, app).await.expect("health server failed");
}

async fn health_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
