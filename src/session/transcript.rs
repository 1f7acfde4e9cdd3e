use serde::{Deserialize, Serialize};

use crate::transport::CaptionResponse;

/// Per-window timing and size figures, overwritten each time a window
/// completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub from_lang: String,
    pub to_lang: String,
    /// Server-side processing time reported by the captioning service
    pub processing_ms: u64,
    /// Round-trip time measured around the upload call
    pub network_ms: u64,
    /// Size of the uploaded window payload
    pub chunk_bytes: usize,
}

/// Accumulated transcript/translation state, exposed read-only to observers
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranscriptState {
    pub original_text: String,
    pub translated_text: String,
    pub last_metrics: Option<WindowMetrics>,
}

/// Merges each window's caption result into the running transcript pair.
///
/// Text grows only by appending; responses are applied in the order their
/// windows were sent, which the upload gate's single-flight discipline
/// guarantees upstream, so no resequencing happens here.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    state: TranscriptState,
    windows_applied: usize,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one window's result and replace the metrics
    pub fn apply(&mut self, response: &CaptionResponse, metrics: WindowMetrics) {
        append_joined(&mut self.state.original_text, &response.transcript);
        append_joined(&mut self.state.translated_text, &response.translated_text);
        self.state.last_metrics = Some(metrics);
        self.windows_applied += 1;
    }

    /// Clear all accumulated state. Called only when a new session starts.
    pub fn reset(&mut self) {
        self.state = TranscriptState::default();
        self.windows_applied = 0;
    }

    pub fn snapshot(&self) -> TranscriptState {
        self.state.clone()
    }

    pub fn windows_applied(&self) -> usize {
        self.windows_applied
    }
}

fn append_joined(text: &mut String, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(fragment);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(transcript: &str, translated: &str) -> CaptionResponse {
        CaptionResponse {
            transcript: transcript.to_string(),
            translated_text: translated.to_string(),
            from_lang: "en".to_string(),
            to_lang: "es".to_string(),
            processing_ms: 10,
        }
    }

    fn metrics(chunk_bytes: usize) -> WindowMetrics {
        WindowMetrics {
            from_lang: "en".to_string(),
            to_lang: "es".to_string(),
            processing_ms: 10,
            network_ms: 5,
            chunk_bytes,
        }
    }

    #[test]
    fn first_window_has_no_leading_separator() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&response("hello", "hola"), metrics(100));

        let state = acc.snapshot();
        assert_eq!(state.original_text, "hello");
        assert_eq!(state.translated_text, "hola");
    }

    #[test]
    fn windows_accumulate_space_joined_in_apply_order() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&response("good", "buenos"), metrics(100));
        acc.apply(&response("morning", "días"), metrics(200));
        acc.apply(&response("everyone", "a todos"), metrics(300));

        let state = acc.snapshot();
        assert_eq!(state.original_text, "good morning everyone");
        assert_eq!(state.translated_text, "buenos días a todos");
        assert_eq!(acc.windows_applied(), 3);
    }

    #[test]
    fn empty_results_do_not_add_separators() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&response("hello", "hola"), metrics(100));
        acc.apply(&response("", ""), metrics(50));
        acc.apply(&response("world", "mundo"), metrics(100));

        let state = acc.snapshot();
        assert_eq!(state.original_text, "hello world");
        assert_eq!(state.translated_text, "hola mundo");
    }

    #[test]
    fn metrics_are_replaced_not_merged() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&response("a", "b"), metrics(100));
        acc.apply(&response("c", "d"), metrics(250));

        let last = acc.snapshot().last_metrics.expect("metrics present");
        assert_eq!(last.chunk_bytes, 250);
    }

    #[test]
    fn reset_clears_text_and_metrics() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&response("hello", "hola"), metrics(100));
        acc.reset();

        let state = acc.snapshot();
        assert!(state.original_text.is_empty());
        assert!(state.translated_text.is_empty());
        assert!(state.last_metrics.is_none());
        assert_eq!(acc.windows_applied(), 0);
    }
}
