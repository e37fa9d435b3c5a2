//! Assistant Desk
//!
//! Client-side orchestration for a RAG + voice assistant backend.
//!
//! # Features
//!
//! - **Chat**: text exchanges appended to an explicitly owned session
//! - **Voice**: audio upload, transcript, spoken reply (base64 decoded)
//! - **Feedback**: thumbs up / down correlated by backend message id
//! - **Knowledge**: incremental text ingestion with capability detection
//! - **Insights**: ping, stats and CSV export
//! - **Intent webhook**: table-driven canned replies for classified intents
//!
//! # Architecture
//!
//! ```text
//! Console ──► Assistant ──────────► BackendClient ──► Backend (HTTP)
//!    │        FeedbackCorrelator ──┤   (x-api-key, per-op timeout)
//!    │        KnowledgeIngestor ───┤
//!    │        Insights ────────────┘
//!    └── Session (in-process history)
//!
//! Webhook (axum) ──► intent::route
//! ```

pub mod assistant;
pub mod audio;
pub mod backend;
pub mod config;
pub mod console;
pub mod error;
pub mod feedback;
pub mod ingest;
pub mod insights;
pub mod intent;
pub mod reply;
pub mod session;
pub mod webhook;

pub use assistant::Assistant;
pub use audio::AudioClip;
pub use backend::{BackendClient, BackendRequest, BackendResponse, TimeoutClass};
pub use config::{Config, Timeouts};
pub use console::{Command, Console};
pub use error::{Capability, ClientError, ClientResult};
pub use feedback::{FeedbackCorrelator, FeedbackOutcome};
pub use ingest::{IngestOutcome, KnowledgeIngestor};
pub use insights::Insights;
pub use reply::{ChatReply, VoiceExchange};
pub use session::{Exchange, MessageId, Rating, Session};
pub use webhook::WebhookServer;
