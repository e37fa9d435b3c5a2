//! Client error taxonomy
//!
//! Every remote call resolves into `Ok` or one of these variants. Skipped
//! operations (empty prompt, missing message id) are not errors and never
//! reach this type.

use std::fmt;
use thiserror::Error;

/// Optional backend features that a deployment may not expose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `POST /ingest/text`
    Ingestion,
    /// `GET /stats`
    Stats,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Ingestion => "ingestion",
            Capability::Stats => "stats",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by backend operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend answered with a non-2xx status, or with a body we could not decode
    #[error("Backend error {status}: {body}")]
    Backend { status: u16, body: String },

    /// Network, connection or timeout failure
    #[error("Transport error: {cause}")]
    Transport { cause: String },

    /// The deployment does not provide this optional feature
    #[error("Backend has no {capability} capability (status {status})")]
    CapabilityUnavailable { capability: Capability, status: u16 },
}

impl ClientError {
    /// Build a transport error from a reqwest failure
    pub fn transport(err: reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            format!("timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        ClientError::Transport { cause }
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Backend { status, .. } => Some(*status),
            ClientError::CapabilityUnavailable { status, .. } => Some(*status),
            ClientError::Transport { .. } => None,
        }
    }

    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, ClientError::CapabilityUnavailable { .. })
    }
}

/// Result type for backend operations
pub type ClientResult<T> = Result<T, ClientError>;
