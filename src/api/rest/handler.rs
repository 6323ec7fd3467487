use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use base64::Engine;

use crate::api::error::ApiError;
use crate::api::rest::types::*;
use crate::store::{ListOptions, ReadOptions, Store, WriteOptions};

pub async fn read_handler(
    State(store): State<Arc<Store>>,
    Query(params): Query<ReadParams>,
) -> Result<Json<ReadResponse>, ApiError> {
    let records = store
        .read(
            params.table.as_deref(),
            &params.key,
            ReadOptions {
                prefix: params.prefix,
                limit: params.limit,
                offset: params.offset,
            },
        )
        .await?;

    let records = records
        .into_iter()
        .map(|r| RecordPayload {
            key: r.key,
            value: base64::engine::general_purpose::STANDARD.encode(&r.value),
            expires_at: r.expires_at,
        })
        .collect();

    Ok(Json(ReadResponse { records }))
}

pub async fn write_handler(
    State(store): State<Arc<Store>>,
    Json(params): Json<WriteParams>,
) -> Result<Json<WriteResponse>, ApiError> {
    let value = base64::engine::general_purpose::STANDARD
        .decode(&params.value)
        .map_err(|_| ApiError::InvalidRequest("invalid base64 value".to_string()))?;

    store
        .write(
            params.table.as_deref(),
            &params.key,
            value,
            WriteOptions {
                ttl: params.ttl.map(Duration::from_secs),
            },
        )
        .await?;

    Ok(Json(WriteResponse { success: true }))
}

pub async fn delete_handler(
    State(store): State<Arc<Store>>,
    Json(params): Json<DeleteParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    store.delete(params.table.as_deref(), &params.key).await?;

    Ok(Json(DeleteResponse { success: true }))
}

pub async fn list_handler(
    State(store): State<Arc<Store>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let keys = store
        .list(
            params.table.as_deref(),
            ListOptions {
                prefix: params.prefix,
                limit: params.limit,
                offset: params.offset,
            },
        )
        .await?;

    Ok(Json(ListResponse { keys }))
}
