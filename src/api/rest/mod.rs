pub mod handler;
pub mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::store::Store;

pub fn routes() -> Router<Arc<Store>> {
    Router::new()
        .route("/v1/read", get(handler::read_handler))
        .route("/v1/write", post(handler::write_handler))
        .route("/v1/delete", post(handler::delete_handler))
        .route("/v1/list", get(handler::list_handler))
}
