//! Message Exchange Orchestrator
//!
//! Turns one user input (text or audio) into one backend request. Text
//! replies are appended to the caller's [`Session`] only after the round trip
//! succeeds; failures leave the history untouched and are returned as-is.

use crate::audio::AudioClip;
use crate::backend::{BackendClient, BackendRequest, TimeoutClass};
use crate::config::Config;
use crate::error::ClientResult;
use crate::reply::{ChatReply, VoiceExchange};
use crate::session::{Exchange, Session};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Chat and voice orchestration over a backend
#[derive(Clone)]
pub struct Assistant {
    backend: BackendClient,
    voice: String,
}

impl Assistant {
    pub fn new(backend: BackendClient, voice: &str) -> Self {
        Self {
            backend,
            voice: voice.to_string(),
        }
    }

    /// Create from config
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Ok(Self::new(BackendClient::new(config)?, &config.voice))
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// Default voice for spoken replies
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Send a text prompt and append the exchange on success
    ///
    /// Blank prompts are skipped without a request (`Ok(None)`). A failed
    /// prompt is remembered on the session for [`Assistant::retry`].
    pub async fn send_text<'s>(
        &self,
        session: &'s mut Session,
        prompt: &str,
    ) -> ClientResult<Option<&'s Exchange>> {
        if prompt.trim().is_empty() {
            debug!("Skipping blank prompt for session {}", session.id());
            return Ok(None);
        }

        let request = BackendRequest::post_json(
            "/chat",
            json!({ "message": prompt, "session_id": session.id() }),
        )
        .timeout(TimeoutClass::Chat);

        let reply = match self.fetch_reply(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat failed for session {}: {}", session.id(), e);
                session.set_pending(prompt);
                return Err(e);
            }
        };

        info!(
            "Chat reply for session {} (message_id={:?}, {} chars)",
            session.id(),
            reply.message_id,
            reply.text.len()
        );

        session.clear_pending();
        session.append(Exchange::new(prompt, &reply.text, reply.message_id));
        Ok(session.last())
    }

    async fn fetch_reply(&self, request: BackendRequest) -> ClientResult<ChatReply> {
        let response = self.backend.call(request).await?;
        Ok(ChatReply::decode(&response.json()?))
    }

    /// Re-send the prompt of the last failed `send_text`, if any
    pub async fn retry<'s>(&self, session: &'s mut Session) -> ClientResult<Option<&'s Exchange>> {
        let Some(prompt) = session.pending().map(str::to_string) else {
            debug!("Nothing to retry for session {}", session.id());
            return Ok(None);
        };
        self.send_text(session, &prompt).await
    }

    /// Drop the session's history
    pub fn clear(&self, session: &mut Session) -> usize {
        session.clear()
    }

    /// Voice round trip: upload audio, get transcript, reply text and audio
    ///
    /// `voice` overrides the configured default. Empty clips are skipped.
    pub async fn send_voice(
        &self,
        session: &Session,
        clip: &AudioClip,
        voice: Option<&str>,
    ) -> ClientResult<Option<VoiceExchange>> {
        if clip.is_empty() {
            debug!("Skipping empty audio clip {}", clip.filename);
            return Ok(None);
        }

        let voice = voice.filter(|v| !v.is_empty()).unwrap_or(self.voice.as_str());
        let request = BackendRequest::post_multipart(
            "/chat/voice",
            clip.clone(),
            vec![
                ("session_id", session.id().to_string()),
                ("voice", voice.to_string()),
            ],
        )
        .timeout(TimeoutClass::Voice);

        let response = self.backend.call(request).await?;
        let exchange = VoiceExchange::decode(response.status, &response.json()?)?;

        info!(
            "Voice reply for session {} (audio={} bytes)",
            session.id(),
            exchange.response_audio.as_ref().map_or(0, Vec::len)
        );
        Ok(Some(exchange))
    }

    /// Transcription only; unauthenticated and independent of any session
    pub async fn transcribe_only(&self, clip: &AudioClip) -> ClientResult<Option<Value>> {
        if clip.is_empty() {
            debug!("Skipping empty audio clip {}", clip.filename);
            return Ok(None);
        }

        let request = BackendRequest::post_multipart("/audio/transcribe", clip.clone(), Vec::new())
            .unauthenticated()
            .timeout(TimeoutClass::Voice);

        let response = self.backend.call(request).await?;
        Ok(Some(response.json()?))
    }
}
