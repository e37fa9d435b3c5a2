//! Feedback Correlator
//!
//! Sends a thumbs up / down for an exchange, keyed by the backend's message
//! id. Exchanges without an id cannot be correlated and are never sent.

use crate::backend::{BackendClient, BackendRequest, TimeoutClass};
use crate::error::ClientResult;
use crate::session::{MessageId, Rating};
use serde_json::json;
use tracing::{debug, info, warn};

/// What happened to a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// Delivered to the backend
    Sent,
    /// The exchange has no message id; nothing was sent
    Uncorrelated,
}

/// Feedback client
#[derive(Clone)]
pub struct FeedbackCorrelator {
    backend: BackendClient,
}

impl FeedbackCorrelator {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Submit a rating for `message_id`
    ///
    /// The response body is ignored; only the status matters.
    pub async fn rate(
        &self,
        message_id: Option<&MessageId>,
        rating: Rating,
    ) -> ClientResult<FeedbackOutcome> {
        let Some(message_id) = message_id else {
            debug!("Rating {:?} dropped: exchange has no message id", rating);
            return Ok(FeedbackOutcome::Uncorrelated);
        };

        let request = BackendRequest::post_json(
            "/feedback",
            json!({ "message_id": message_id.as_json(), "rating": rating.value() }),
        )
        .timeout(TimeoutClass::Interactive);

        match self.backend.call(request).await {
            Ok(_) => {
                info!("Feedback {} recorded for message {}", rating.value(), message_id);
                Ok(FeedbackOutcome::Sent)
            }
            Err(e) => {
                warn!("Feedback for message {} failed: {}", message_id, e);
                Err(e)
            }
        }
    }
}
