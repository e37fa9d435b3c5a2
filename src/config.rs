//! Configuration management

use anyhow::Result;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_BACKEND_URL: &str = "https://localhost:9000";

/// Default text-to-speech voice
pub const DEFAULT_VOICE: &str = "alloy";

/// Default session identifier
pub const DEFAULT_SESSION_ID: &str = "default";

/// Default intent webhook port
pub const DEFAULT_WEBHOOK_PORT: u16 = 8088;

/// Per-operation timeout classes
///
/// interactive < chat < voice < export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Feedback, stats, ping
    pub interactive: Duration,
    /// Text chat and knowledge ingestion
    pub chat: Duration,
    /// Voice round trip and transcription
    pub voice: Duration,
    /// Bulk CSV export
    pub export: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            interactive: Duration::from_secs(10),
            chat: Duration::from_secs(60),
            voice: Duration::from_secs(120),
            export: Duration::from_secs(300),
        }
    }
}

impl Timeouts {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interactive: secs_var("ASSISTANT_TIMEOUT_INTERACTIVE_SECS", defaults.interactive),
            chat: secs_var("ASSISTANT_TIMEOUT_CHAT_SECS", defaults.chat),
            voice: secs_var("ASSISTANT_TIMEOUT_VOICE_SECS", defaults.voice),
            export: secs_var("ASSISTANT_TIMEOUT_EXPORT_SECS", defaults.export),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without trailing slash
    pub backend_url: String,

    /// API key sent as `x-api-key` (empty = no header)
    pub api_key: String,

    /// Voice used for spoken replies
    pub voice: String,

    /// Session identifier sent with chat and voice requests
    pub session_id: String,

    /// Accept self-signed certificates from the backend
    pub accept_invalid_certs: bool,

    /// Timeout per operation class
    pub timeouts: Timeouts,

    /// Intent webhook bind address
    pub webhook_addr: IpAddr,

    /// Intent webhook port
    pub webhook_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_key: String::new(),
            voice: DEFAULT_VOICE.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            accept_invalid_certs: false,
            timeouts: Timeouts::default(),
            webhook_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            webhook_port: DEFAULT_WEBHOOK_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let backend_url = non_empty_var("BACKEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.backend_url);

        let api_key = non_empty_var("INTERNAL_API_KEY").unwrap_or_default();

        let voice = non_empty_var("TTS_VOICE").unwrap_or(defaults.voice);

        let session_id = non_empty_var("SESSION_ID").unwrap_or(defaults.session_id);

        let accept_invalid_certs = std::env::var("BACKEND_ACCEPT_INVALID_CERTS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let webhook_addr = std::env::var("WEBHOOK_BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.webhook_addr);

        let webhook_port = std::env::var("WEBHOOK_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.webhook_port);

        Ok(Self {
            backend_url,
            api_key,
            voice,
            session_id,
            accept_invalid_certs,
            timeouts: Timeouts::from_env(),
            webhook_addr,
            webhook_port,
        })
    }

    /// Config pointing at a specific backend, everything else default
    pub fn for_backend(url: &str) -> Self {
        Self {
            backend_url: url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    /// Whether requests carry an API key header
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Webhook listen address
    pub fn webhook_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.webhook_addr, self.webhook_port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_var(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend_url, "https://localhost:9000");
        assert_eq!(config.voice, "alloy");
        assert_eq!(config.session_id, "default");
        assert!(!config.has_api_key());
        assert_eq!(config.webhook_socket_addr().port(), 8088);
    }

    #[test]
    fn test_timeout_classes_ordered() {
        let t = Timeouts::default();
        assert!(t.interactive < t.chat);
        assert!(t.chat < t.voice);
        assert!(t.voice < t.export);
    }

    #[test]
    fn test_for_backend_strips_trailing_slash() {
        let config = Config::for_backend("http://127.0.0.1:9000/").with_api_key("secret");
        assert_eq!(config.backend_url, "http://127.0.0.1:9000");
        assert!(config.has_api_key());
    }

    // Every env-mutating case lives in this one test so they never race
    #[test]
    fn test_from_env_fallbacks_and_overrides() {
        let vars = [
            ("BACKEND_URL", "  "),
            ("INTERNAL_API_KEY", "   "),
            ("TTS_VOICE", ""),
            ("SESSION_ID", " "),
            ("WEBHOOK_PORT", "abc"),
            ("WEBHOOK_BIND_ADDR", "not-an-ip"),
            ("ASSISTANT_TIMEOUT_CHAT_SECS", "x"),
            ("ASSISTANT_TIMEOUT_EXPORT_SECS", "-5"),
        ];
        for (name, value) in vars {
            std::env::set_var(name, value);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.api_key, "");
        assert!(!config.has_api_key());
        assert_eq!(config.voice, DEFAULT_VOICE);
        assert_eq!(config.session_id, DEFAULT_SESSION_ID);
        assert_eq!(config.webhook_socket_addr(), Config::default().webhook_socket_addr());
        assert_eq!(config.timeouts, Timeouts::default());

        std::env::set_var("BACKEND_URL", " https://rag.internal:8443/ ");
        std::env::set_var("INTERNAL_API_KEY", " k-123 ");
        std::env::set_var("TTS_VOICE", "nova");
        std::env::set_var("SESSION_ID", "desk-7");
        std::env::set_var("WEBHOOK_PORT", "9100");
        std::env::set_var("WEBHOOK_BIND_ADDR", "0.0.0.0");
        std::env::set_var("ASSISTANT_TIMEOUT_CHAT_SECS", "90");

        let config = Config::from_env().unwrap();
        assert_eq!(config.backend_url, "https://rag.internal:8443");
        assert_eq!(config.api_key, "k-123");
        assert_eq!(config.voice, "nova");
        assert_eq!(config.session_id, "desk-7");
        assert_eq!(config.webhook_socket_addr().to_string(), "0.0.0.0:9100");
        assert_eq!(config.timeouts.chat, Duration::from_secs(90));
        assert_eq!(config.timeouts.voice, Timeouts::default().voice);

        for (name, _) in vars {
            std::env::remove_var(name);
        }
    }
}
