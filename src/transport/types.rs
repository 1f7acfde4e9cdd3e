use serde::{Deserialize, Serialize};

/// Success payload returned by the captioning service for one window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionResponse {
    /// Transcribed text for the window
    pub transcript: String,
    /// Translated text for the window
    pub translated_text: String,
    /// Echoed source language
    pub from_lang: String,
    /// Echoed target language
    pub to_lang: String,
    /// Server-side processing time in milliseconds
    pub processing_ms: u64,
}

/// Error body shape used by the captioning service
#[derive(Debug, Deserialize)]
pub struct ServiceErrorBody {
    pub detail: Option<String>,
}
