pub mod error;
pub mod rest;
pub mod rpc;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::store::Store;

pub fn app(store: Arc<Store>) -> Router {
    Router::new()
        .merge(rest::routes())
        .nest("/rpc", rpc::routes())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<axum::body::Body>| {
            tracing::span!(
                Level::INFO,
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .with_state(store)
}

pub async fn start_api_server(addr: SocketAddr, store: Arc<Store>) {
    tracing::info!("starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind API address");
    axum::serve(listener, app(store))
        .await
        .expect("API server failed");
}
