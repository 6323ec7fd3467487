use std::time::Duration;

use base64::Engine;

use crate::api::rest::types::{ListResponse, ReadResponse, RecordPayload};
use crate::ctl::types::CtlError;

/// HTTP client for the tablekv API, shared by all subcommands.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    table: Option<String>,
}

impl ApiClient {
    pub fn new(server: &str, table: Option<String>, timeout: Duration) -> Result<Self, CtlError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base: server.trim_end_matches('/').to_string(),
            table,
        })
    }

    pub async fn read(
        &self,
        key: &str,
        prefix: bool,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<RecordPayload>, CtlError> {
        let mut query = vec![
            ("key".to_string(), key.to_string()),
            ("prefix".to_string(), prefix.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(table) = &self.table {
            query.push(("table".to_string(), table.clone()));
        }

        let resp = self
            .http
            .get(format!("{}/v1/read", self.base))
            .query(&query)
            .send()
            .await?;
        let resp = expect_ok(resp).await?;

        let body: ReadResponse = resp.json().await?;
        Ok(body.records)
    }

    pub async fn write(&self, key: &str, value: &[u8], ttl: Option<u64>) -> Result<(), CtlError> {
        let body = serde_json::json!({
            "key": key,
            "value": base64::engine::general_purpose::STANDARD.encode(value),
            "ttl": ttl,
            "table": self.table,
        });

        let resp = self
            .http
            .post(format!("{}/v1/write", self.base))
            .json(&body)
            .send()
            .await?;
        expect_ok(resp).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), CtlError> {
        let body = serde_json::json!({
            "key": key,
            "table": self.table,
        });

        let resp = self
            .http
            .post(format!("{}/v1/delete", self.base))
            .json(&body)
            .send()
            .await?;
        expect_ok(resp).await?;
        Ok(())
    }

    pub async fn list(
        &self,
        prefix: Option<&str>,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<String>, CtlError> {
        let mut query = vec![("offset".to_string(), offset.to_string())];
        if let Some(prefix) = prefix {
            query.push(("prefix".to_string(), prefix.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(table) = &self.table {
            query.push(("table".to_string(), table.clone()));
        }

        let resp = self
            .http
            .get(format!("{}/v1/list", self.base))
            .query(&query)
            .send()
            .await?;
        let resp = expect_ok(resp).await?;

        let body: ListResponse = resp.json().await?;
        Ok(body.keys)
    }
}

async fn expect_ok(resp: reqwest::Response) -> Result<reqwest::Response, CtlError> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let body: serde_json::Value = resp.json().await.unwrap_or_default();
    let message = body
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown server error")
        .to_string();
    Err(CtlError::Server(message))
}
