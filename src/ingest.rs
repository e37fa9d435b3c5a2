//! Knowledge Ingestion Dispatcher
//!
//! Pushes free-text documents into the backend's index. A deployment
//! without `/ingest/text` answers non-2xx, which is reported as
//! [`ClientError::CapabilityUnavailable`] so callers can offer another path.

use crate::backend::{BackendClient, BackendRequest, TimeoutClass};
use crate::error::{Capability, ClientError, ClientResult};
use serde_json::json;
use tracing::{debug, info, warn};

/// Source label used when the caller gives none
pub const DEFAULT_SOURCE_LABEL: &str = "runtime_notes.txt";

/// Result of an ingestion attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Document accepted by the backend
    Indexed,
    /// Blank text; nothing was sent
    Skipped,
}

/// Ingestion client
#[derive(Clone)]
pub struct KnowledgeIngestor {
    backend: BackendClient,
}

impl KnowledgeIngestor {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Send `text` tagged with `source_label`
    pub async fn ingest(&self, text: &str, source_label: &str) -> ClientResult<IngestOutcome> {
        if text.trim().is_empty() {
            debug!("Skipping blank document from {}", source_label);
            return Ok(IngestOutcome::Skipped);
        }

        let source = if source_label.trim().is_empty() {
            DEFAULT_SOURCE_LABEL
        } else {
            source_label
        };

        let request = BackendRequest::post_json("/ingest/text", json!({ "text": text, "source": source }))
            .timeout(TimeoutClass::Chat);

        let response = self.backend.send(request).await?;

        if !response.is_success() {
            warn!(
                "Ingestion endpoint unavailable (status {}) for {}",
                response.status, source
            );
            return Err(ClientError::CapabilityUnavailable {
                capability: Capability::Ingestion,
                status: response.status,
            });
        }

        info!("Indexed {} chars from {}", text.len(), source);
        Ok(IngestOutcome::Indexed)
    }
}
