pub mod example;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::error::ApiError;
use crate::store::Store;

pub fn routes() -> Router<Arc<Store>> {
    Router::new().route("/:service/:method", post(call_handler))
}

/// Method-set dispatch for deployed services. Only the example service is
/// registered; unknown services and methods are 404s.
async fn call_handler(
    State(store): State<Arc<Store>>,
    Path((service, method)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match (service.as_str(), method.as_str()) {
        ("example", "TestExpiry") => example::test_expiry(&store).await?,
        ("example", "TestList") => example::test_list(&store).await?,
        ("example", "TestListLimit") => example::test_list_limit(&store).await?,
        ("example", "TestListOffset") => example::test_list_offset(&store).await?,
        _ => return Err(ApiError::MethodNotFound(format!("{service}.{method}"))),
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
