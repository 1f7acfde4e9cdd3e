use reqwest::multipart;
use thiserror::Error;
use tracing::debug;

use crate::session::UploadWindow;

use super::types::{CaptionResponse, ServiceErrorBody};

/// Errors raised while sending one upload window.
///
/// All of these are local to a single window: the session drops the window,
/// surfaces the error on its status line, and keeps recording.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service error ({status}): {detail}")]
    Service { status: u16, detail: String },

    #[error("malformed caption response: {0}")]
    Malformed(String),
}

/// Boundary to the remote transcription+translation service: one window of
/// audio bytes in, one caption pair out.
#[async_trait::async_trait]
pub trait CaptionTransport: Send + Sync {
    async fn send_window(&self, window: &UploadWindow) -> Result<CaptionResponse, TransportError>;
}

/// HTTP client for the captioning endpoint.
///
/// Posts each window as a multipart form (`audio`, `from_lang`, `to_lang`)
/// with an optional bearer credential. No timeout beyond the transport's
/// own behavior and no retries; a failed window is simply dropped upstream.
pub struct HttpCaptionClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpCaptionClient {
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            auth_token,
        })
    }
}

#[async_trait::async_trait]
impl CaptionTransport for HttpCaptionClient {
    async fn send_window(&self, window: &UploadWindow) -> Result<CaptionResponse, TransportError> {
        let part = multipart::Part::bytes(window.payload.clone())
            .file_name("window.wav")
            .mime_str("audio/wav")
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let form = multipart::Form::new()
            .part("audio", part)
            .text("from_lang", window.languages.from.clone())
            .text("to_lang", window.languages.to.clone());

        debug!(
            "Uploading window {} ({} bytes) to {}",
            window.sequence,
            window.byte_len(),
            self.endpoint
        );

        let mut request = self.http.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ServiceErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });

            return Err(TransportError::Service {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
