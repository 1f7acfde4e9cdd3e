use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::session::CaptureSession;
use crate::transport::CaptionTransport;

/// Capture settings inherited from service configuration
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Default flush period for new sessions
    pub window_period: Duration,
    /// Fragment duration handed to capture devices
    pub fragment_duration_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            window_period: Duration::from_millis(3000),
            fragment_duration_ms: 100,
        }
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single active capture session, if any (one microphone per page)
    pub session: Arc<RwLock<Option<Arc<CaptureSession>>>>,

    /// Transport used by sessions to reach the captioning service
    pub transport: Arc<dyn CaptionTransport>,

    /// Capture settings for new sessions
    pub settings: CaptureSettings,
}

impl AppState {
    pub fn new(transport: Arc<dyn CaptionTransport>, settings: CaptureSettings) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            transport,
            settings,
        }
    }
}
