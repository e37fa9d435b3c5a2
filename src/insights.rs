//! Backend insights: reachability, stats and message export

use crate::backend::{BackendClient, BackendRequest, TimeoutClass};
use crate::error::{Capability, ClientError, ClientResult};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// File name the export is saved under by default
pub const DEFAULT_EXPORT_FILE: &str = "messages_export.csv";

/// Read-only backend queries
#[derive(Clone)]
pub struct Insights {
    backend: BackendClient,
}

impl Insights {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// GET the base URL; any HTTP answer counts as reachable
    pub async fn ping(&self) -> ClientResult<u16> {
        let response = self
            .backend
            .send(BackendRequest::get("").unauthenticated())
            .await?;
        info!("Backend {} reachable: {}", self.backend.base_url(), response.status);
        Ok(response.status)
    }

    /// Usage stats; deployments without `/stats` report `CapabilityUnavailable`
    pub async fn stats(&self) -> ClientResult<Value> {
        let response = self.backend.send(BackendRequest::get("/stats")).await?;

        if !response.is_success() {
            return Err(ClientError::CapabilityUnavailable {
                capability: Capability::Stats,
                status: response.status,
            });
        }

        response.json()
    }

    /// Raw CSV export of all stored messages
    pub async fn export_messages_csv(&self) -> ClientResult<Vec<u8>> {
        let request = BackendRequest::get("/export/messages.csv").timeout(TimeoutClass::Export);
        let response = self.backend.call(request).await.map_err(|e| {
            warn!("Export failed: {}", e);
            e
        })?;
        info!("Exported {} bytes of messages", response.body.len());
        Ok(response.body)
    }
}

/// Write an export to disk, creating parent directories
pub fn save_export(csv: &[u8], path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, csv)?;
    info!("Saved export to {}", path.display());
    Ok(())
}
