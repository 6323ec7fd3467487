use std::sync::Arc;

use tokio::signal;
use tracing::info;

use crate::store::Store;

pub struct ServerHandle {
    pub api_handle: tokio::task::JoinHandle<()>,
    pub store: Arc<Store>,
}

impl ServerHandle {
    pub async fn wait_for_shutdown(self) {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down...");
            }
            _ = terminate() => {
                info!("received SIGTERM, shutting down...");
            }
        }

        // Stop the reaper before tearing down the API
        self.store.shutdown();

        self.api_handle.abort();
        let _ = self.api_handle.await;

        info!("server shutdown complete");
    }
}

async fn terminate() {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .expect("failed to install SIGTERM handler")
        .recv()
        .await;
}
