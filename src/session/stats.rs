use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::LanguagePair;
use super::session::SessionState;

/// Statistics about a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: String,

    /// Current lifecycle state
    pub state: SessionState,

    /// Latest user-facing status line
    pub status_line: String,

    /// Language pair for this session
    pub languages: LanguagePair,

    /// When recording started, if it did
    pub started_at: Option<DateTime<Utc>>,

    /// Total duration in seconds since recording started
    pub duration_secs: f64,

    /// Windows accepted by the captioning service
    pub windows_sent: usize,

    /// Windows dropped on transport or service failure
    pub windows_failed: usize,

    /// Whether an upload is outstanding right now
    pub upload_in_flight: bool,

    /// Windows merged into the transcript so far
    pub windows_applied: usize,
}
