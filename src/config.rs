use serde::Deserialize;

use crate::store::StoreConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub api_addr: String,
    pub metrics_addr: String,
    pub health_addr: String,
}
