use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ReadParams {
    pub key: String,
    #[serde(default)]
    pub prefix: bool,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
    pub table: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordPayload {
    pub key: String,
    pub value: String, // base64-encoded
    pub expires_at: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadResponse {
    pub records: Vec<RecordPayload>,
}

#[derive(Debug, Deserialize)]
pub struct WriteParams {
    pub key: String,
    pub value: String, // base64-encoded
    #[serde(default)]
    pub ttl: Option<u64>, // seconds
    pub table: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub key: String,
    pub table: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub prefix: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
    pub table: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub keys: Vec<String>,
}
