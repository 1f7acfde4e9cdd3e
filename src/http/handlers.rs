use super::state::AppState;
use crate::audio::{CaptureConfig, CaptureDeviceFactory, CaptureSource};
use crate::error::SessionError;
use crate::session::{
    CaptureSession, LanguagePair, SessionConfig, SessionState, SessionStats, TranscriptState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartCaptureRequest {
    /// Source language code (e.g. "en")
    pub from_lang: String,

    /// Target language code (e.g. "es")
    pub to_lang: String,

    /// Flush period override in milliseconds (default from configuration)
    pub window_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StartCaptureResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopCaptureResponse {
    pub session_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /captions/start
/// Start a new capture session
pub async fn start_capture(
    State(state): State<AppState>,
    Json(req): Json<StartCaptureRequest>,
) -> impl IntoResponse {
    // Serialize start attempts: the microphone is a single exclusive resource
    let mut active = state.session.write().await;

    if let Some(session) = active.as_ref() {
        let session_state = session.state().await;
        if matches!(
            session_state,
            SessionState::Acquiring | SessionState::Recording | SessionState::Stopping
        ) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} is already capturing", session.id()),
                }),
            )
                .into_response();
        }
    }

    let languages = LanguagePair::new(req.from_lang, req.to_lang);
    let mut config = SessionConfig::new(languages).with_window_period(state.settings.window_period);
    if let Some(window_ms) = req.window_ms {
        config.window_period = Duration::from_millis(window_ms);
    }

    info!(
        "Starting capture for session: {} ({})",
        config.session_id, config.languages
    );

    let device = match CaptureDeviceFactory::create(
        CaptureSource::Microphone,
        CaptureConfig {
            fragment_duration_ms: state.settings.fragment_duration_ms,
            ..CaptureConfig::default()
        },
    ) {
        Ok(device) => device,
        Err(e) => {
            error!("Failed to create capture device: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create capture device: {}", e),
                }),
            )
                .into_response();
        }
    };

    let session = Arc::new(CaptureSession::new(config, Arc::clone(&state.transport)));

    match session.start(device).await {
        Ok(()) => {
            let session_id = session.id().to_string();

            // A superseded session must not write into the new transcript;
            // its still-outstanding uploads are discarded on completion.
            if let Some(old) = active.replace(Arc::clone(&session)) {
                old.invalidate();
            }

            info!("Capture started for session: {}", session_id);

            (
                StatusCode::OK,
                Json(StartCaptureResponse {
                    session_id: session_id.clone(),
                    status: "recording".to_string(),
                    message: format!("Capture started for session {}", session_id),
                }),
            )
                .into_response()
        }
        Err(SessionError::InvalidConfiguration) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Source and target language cannot be the same".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start capture: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to start capture: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /captions/stop
/// Stop the active capture session
pub async fn stop_capture(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await.clone();

    match session {
        Some(session) => {
            let stats = session.stop().await;
            info!("Capture stopped for session: {}", session.id());

            (
                StatusCode::OK,
                Json(StopCaptureResponse {
                    session_id: session.id().to_string(),
                    status: "stopped".to_string(),
                    stats,
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No capture session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /captions/status
/// Get status of the active capture session
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await.clone();

    match session {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No capture session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /captions/transcript
/// Get the transcript accumulated so far
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await.clone();

    match session {
        Some(session) => {
            let transcript: TranscriptState = session.transcript().await;
            (StatusCode::OK, Json(transcript)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No capture session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
