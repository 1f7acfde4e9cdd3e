use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Source/target language pair, immutable for a session's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub from: String,
    pub to: String,
}

impl LanguagePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// A pair is usable iff source and target differ
    pub fn is_valid(&self) -> bool {
        self.from != self.to
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Configuration for a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "capture-7b9d…")
    pub session_id: String,

    /// Language pair sent with every upload window
    pub languages: LanguagePair,

    /// Period between flush attempts
    /// Default: 3000 ms
    pub window_period: Duration,
}

impl SessionConfig {
    pub fn new(languages: LanguagePair) -> Self {
        Self {
            session_id: format!("capture-{}", uuid::Uuid::new_v4()),
            languages,
            window_period: Duration::from_millis(3000),
        }
    }

    pub fn with_window_period(mut self, period: Duration) -> Self {
        self.window_period = period;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(LanguagePair::new("en", "es"))
    }
}
