//! Audio payloads
//!
//! Uploaded clips and the base64 audio returned by voice round trips.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mime_guess::Mime;
use std::io;
use std::path::Path;

/// Extensions accepted for upload
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "webm"];

/// An audio file ready to be sent as multipart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, filename: &str, mime: &str) -> Self {
        Self {
            bytes,
            filename: filename.to_string(),
            mime: mime.to_string(),
        }
    }

    /// Read a clip from disk, guessing its MIME type from the extension
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "unsupported audio type '{}' (expected one of {})",
                    extension,
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            ));
        }

        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        Ok(Self { bytes, filename, mime })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Declared MIME type, or `application/octet-stream` when it does not parse
    pub fn content_type(&self) -> Mime {
        self.mime
            .trim()
            .parse()
            .unwrap_or(mime_guess::mime::APPLICATION_OCTET_STREAM)
    }
}

/// Decode the `response_audio_b64` field
pub fn decode_audio(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded.trim())
}

/// Encode audio the way the backend ships it
pub fn encode_audio(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
