//! Response decoding
//!
//! Backend deployments disagree on field names, so reply text is read
//! through an ordered fallback table instead of ad hoc lookups.
//!
//! | Value          | Fields tried, in order        | If none present |
//! |----------------|-------------------------------|-----------------|
//! | chat reply     | `response`, `answer`          | `""`            |
//! | message id     | `message_id`                  | none            |
//! | transcript     | `transcript`                  | `""`            |
//! | voice reply    | `response_text`               | `""`            |
//! | voice audio    | `response_audio_b64` (base64) | none            |

use crate::audio::decode_audio;
use crate::error::{ClientError, ClientResult};
use crate::session::MessageId;
use serde_json::Value;

pub const CHAT_TEXT_FIELDS: &[&str] = &["response", "answer"];
pub const MESSAGE_ID_FIELDS: &[&str] = &["message_id"];
pub const TRANSCRIPT_FIELDS: &[&str] = &["transcript"];
pub const VOICE_TEXT_FIELDS: &[&str] = &["response_text"];
pub const VOICE_AUDIO_FIELDS: &[&str] = &["response_audio_b64"];

/// First field holding a non-empty string
pub fn first_text(body: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        body.get(*field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    })
}

/// First field holding a usable message id
pub fn first_message_id(body: &Value, fields: &[&str]) -> Option<MessageId> {
    fields
        .iter()
        .find_map(|field| body.get(*field).and_then(MessageId::from_json))
}

/// Decoded `/chat` response
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub message_id: Option<MessageId>,
}

impl ChatReply {
    pub fn decode(body: &Value) -> Self {
        Self {
            text: first_text(body, CHAT_TEXT_FIELDS).unwrap_or_default(),
            message_id: first_message_id(body, MESSAGE_ID_FIELDS),
        }
    }
}

/// Result of one voice round trip (not stored in the session)
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceExchange {
    pub transcript: String,
    pub response_text: String,
    /// Decoded audio, ready for playback
    pub response_audio: Option<Vec<u8>>,
}

impl VoiceExchange {
    /// Decode a `/chat/voice` response; bad base64 is a backend error
    pub fn decode(status: u16, body: &Value) -> ClientResult<Self> {
        let response_audio = match first_text(body, VOICE_AUDIO_FIELDS) {
            Some(encoded) => Some(decode_audio(&encoded).map_err(|e| ClientError::Backend {
                status,
                body: format!("invalid response audio: {}", e),
            })?),
            None => None,
        };

        Ok(Self {
            transcript: first_text(body, TRANSCRIPT_FIELDS).unwrap_or_default(),
            response_text: first_text(body, VOICE_TEXT_FIELDS).unwrap_or_default(),
            response_audio,
        })
    }
}
