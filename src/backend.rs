//! Backend Transport Client
//!
//! Thin reqwest wrapper around the assistant backend. Every call is an
//! independent attempt: no retries, no pooled connections, its own timeout.
//! All failures come back as [`ClientError`].

use crate::audio::AudioClip;
use crate::config::{Config, Timeouts};
use crate::error::{ClientError, ClientResult};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the internal API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Timeout class of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    Interactive,
    Chat,
    Voice,
    Export,
}

impl TimeoutClass {
    pub fn duration(&self, timeouts: &Timeouts) -> Duration {
        match self {
            TimeoutClass::Interactive => timeouts.interactive,
            TimeoutClass::Chat => timeouts.chat,
            TimeoutClass::Voice => timeouts.voice,
            TimeoutClass::Export => timeouts.export,
        }
    }
}

/// Request body
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Json(Value),
    /// Audio file under the `file` field plus plain text fields
    Multipart {
        audio: AudioClip,
        fields: Vec<(&'static str, String)>,
    },
}

/// One outbound call, relative to the configured base URL
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub payload: Payload,
    pub authenticated: bool,
    pub timeout: TimeoutClass,
}

impl BackendRequest {
    fn new(method: Method, path: &str, payload: Payload) -> Self {
        Self {
            method,
            path: path.to_string(),
            payload,
            authenticated: true,
            timeout: TimeoutClass::Interactive,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path, Payload::Empty)
    }

    pub fn post_json(path: &str, body: Value) -> Self {
        Self::new(Method::POST, path, Payload::Json(body))
    }

    pub fn post_multipart(path: &str, audio: AudioClip, fields: Vec<(&'static str, String)>) -> Self {
        Self::new(Method::POST, path, Payload::Multipart { audio, fields })
    }

    /// Do not attach the API key
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn timeout(mut self, class: TimeoutClass) -> Self {
        self.timeout = class;
        self
    }
}

/// Raw backend response
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as (lossy) UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body as JSON; undecodable bodies are reported as backend errors
    pub fn json(&self) -> ClientResult<Value> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::Backend {
            status: self.status,
            body: format!("invalid JSON ({}): {}", e, self.text()),
        })
    }

    /// Turn a non-2xx response into `ClientError::Backend`
    pub fn into_success(self) -> ClientResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Backend {
                status: self.status,
                body: self.text(),
            })
        }
    }
}

/// Backend HTTP client
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeouts: Timeouts,
}

impl BackendClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(ClientError::transport)?;

        if config.accept_invalid_certs {
            warn!("TLS certificate verification disabled for {}", config.backend_url);
        }

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeouts: config.timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and return the response whatever its status
    ///
    /// Only network-level failures are errors here.
    pub async fn send(&self, request: BackendRequest) -> ClientResult<BackendResponse> {
        let timeout = request.timeout.duration(&self.timeouts);
        let url = self.url(&request.path);

        debug!(
            "Backend call: {} {} (timeout={}s, auth={})",
            request.method,
            request.path,
            timeout.as_secs(),
            request.authenticated && !self.api_key.is_empty()
        );

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(timeout);

        if request.authenticated && !self.api_key.is_empty() {
            builder = builder.header(API_KEY_HEADER, &self.api_key);
        }

        builder = match request.payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart { audio, fields } => builder.multipart(multipart_form(audio, fields)?),
        };

        let response = builder.send().await.map_err(|e| {
            warn!("Backend call {} {} failed: {}", request.method, request.path, e);
            ClientError::transport(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(ClientError::transport)?.to_vec();

        debug!("Backend call {} {} -> {}", request.method, request.path, status);

        Ok(BackendResponse { status, body })
    }

    /// Issue a request; non-2xx becomes `ClientError::Backend`
    pub async fn call(&self, request: BackendRequest) -> ClientResult<BackendResponse> {
        self.send(request).await?.into_success()
    }
}

fn multipart_form(audio: AudioClip, fields: Vec<(&'static str, String)>) -> ClientResult<Form> {
    let content_type = audio.content_type();
    let part = Part::bytes(audio.bytes)
        .file_name(audio.filename)
        .mime_str(content_type.as_ref())
        .map_err(ClientError::transport)?;

    let form = fields
        .into_iter()
        .fold(Form::new().part("file", part), |form, (name, value)| form.text(name, value));

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = BackendRequest::get("/stats");
        assert_eq!(request.method, Method::GET);
        assert!(request.authenticated);
        assert_eq!(request.timeout, TimeoutClass::Interactive);

        let request = BackendRequest::post_json("/chat", serde_json::json!({}))
            .timeout(TimeoutClass::Chat)
            .unauthenticated();
        assert_eq!(request.method, Method::POST);
        assert!(!request.authenticated);
        assert_eq!(request.timeout, TimeoutClass::Chat);
    }

    #[test]
    fn test_timeout_class_mapping() {
        let timeouts = Timeouts::default();
        assert_eq!(TimeoutClass::Voice.duration(&timeouts), timeouts.voice);
        assert_eq!(TimeoutClass::Export.duration(&timeouts), timeouts.export);
    }

    #[test]
    fn test_response_into_success() {
        let ok = BackendResponse { status: 201, body: b"{}".to_vec() };
        assert!(ok.into_success().is_ok());

        let failed = BackendResponse { status: 503, body: b"down".to_vec() };
        match failed.into_success() {
            Err(ClientError::Backend { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_response_invalid_json() {
        let response = BackendResponse { status: 200, body: b"<html>".to_vec() };
        let err = response.json().unwrap_err();
        assert_eq!(err.status(), Some(200));
    }
}
