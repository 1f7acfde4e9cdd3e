//! HTTP API server for capture control (UI surface)
//!
//! This module provides a REST API for driving the capture session:
//! - POST /captions/start - Start a capture session
//! - POST /captions/stop - Stop the active session
//! - GET /captions/status - Query session state and status line
//! - GET /captions/transcript - Get the accumulated transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{StartCaptureRequest, StartCaptureResponse, StopCaptureResponse};
pub use routes::create_router;
pub use state::{AppState, CaptureSettings};
