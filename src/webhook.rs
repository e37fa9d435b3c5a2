//! Intent Webhook Server
//!
//! Axum server exposing the intent router as a fulfillment webhook,
//! with request tracing and graceful shutdown.

use crate::config::Config;
use crate::intent;
use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Shared webhook state
#[derive(Clone)]
pub struct WebhookState {
    /// Server start time for uptime calculation
    pub start_time: Instant,
    pub version: &'static str,
}

impl WebhookState {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

impl Default for WebhookState {
    fn default() -> Self {
        Self::new()
    }
}

/// Incoming fulfillment request (only the intent name is read)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub query_result: Option<QueryResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub intent: Option<IntentInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentInfo {
    #[serde(default)]
    pub display_name: Option<String>,
}

impl WebhookRequest {
    /// Parse leniently: anything unreadable is treated as "no intent"
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            debug!("Unreadable webhook payload: {}", e);
            Self::default()
        })
    }

    pub fn intent_name(&self) -> Option<&str> {
        self.query_result
            .as_ref()
            .and_then(|q| q.intent.as_ref())
            .and_then(|i| i.display_name.as_deref())
    }
}

/// Fulfillment reply
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_text: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Fulfillment handler; always answers 200 with a reply
pub async fn fulfill(body: Bytes) -> Json<WebhookResponse> {
    let request = WebhookRequest::parse(&body);
    let reply = intent::route(request.intent_name());
    Json(WebhookResponse {
        fulfillment_text: reply.to_string(),
    })
}

pub async fn health(State(state): State<Arc<WebhookState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.version,
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Build the webhook router
pub fn router() -> Router {
    Router::new()
        .route("/webhook", post(fulfill))
        .route("/health", get(health))
        .with_state(Arc::new(WebhookState::new()))
        .layer(TraceLayer::new_for_http())
}

/// Webhook server
pub struct WebhookServer {
    addr: SocketAddr,
}

impl WebhookServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.webhook_socket_addr())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until Ctrl+C / SIGTERM
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Starting intent webhook on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        axum::serve(listener, router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Intent webhook shut down gracefully");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_intent() {
        let body = br#"{"queryResult": {"queryText": "reset my password", "intent": {"displayName": "Password Reset"}}}"#;
        let request = WebhookRequest::parse(body);
        assert_eq!(request.intent_name(), Some("Password Reset"));
    }

    #[test]
    fn test_parse_tolerates_garbage() {
        assert_eq!(WebhookRequest::parse(b"not json").intent_name(), None);
        assert_eq!(WebhookRequest::parse(b"{}").intent_name(), None);
        assert_eq!(WebhookRequest::parse(br#"{"queryResult": {}}"#).intent_name(), None);
        assert_eq!(
            WebhookRequest::parse(br#"{"queryResult": {"intent": {"displayName": 5}}}"#).intent_name(),
            None
        );
    }

    #[test]
    fn test_response_field_name() {
        let json = serde_json::to_value(WebhookResponse {
            fulfillment_text: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"fulfillmentText": "hi"}));
    }
}
