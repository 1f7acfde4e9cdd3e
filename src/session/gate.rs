use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::transport::{CaptionTransport, TransportError};

use super::buffer::{ChunkBuffer, UploadWindow};
use super::config::LanguagePair;
use super::session::{SessionState, STATUS_RECORDING};
use super::transcript::{TranscriptAccumulator, WindowMetrics};

/// Everything an in-flight upload needs to route its completion.
#[derive(Clone)]
pub(crate) struct UploadContext {
    pub session_id: String,
    pub languages: LanguagePair,
    pub transport: Arc<dyn CaptionTransport>,
    pub transcript: Arc<Mutex<TranscriptAccumulator>>,
    pub state: Arc<Mutex<SessionState>>,
    pub status: Arc<Mutex<String>>,
    /// Cleared when this session is superseded; late results are then discarded
    pub live: Arc<AtomicBool>,
}

impl UploadContext {
    /// Update the status line unless the session has already left `Recording`
    /// (a late completion must not overwrite a post-stop status).
    async fn set_status_while_recording(&self, message: &str) {
        if *self.state.lock().await == SessionState::Recording {
            *self.status.lock().await = message.to_string();
        }
    }
}

/// Outcome of one flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushOutcome {
    /// A window was handed to the transport
    Sent { sequence: u64, bytes: usize },
    /// An earlier window is still in flight; audio stays buffered
    SkippedBusy,
    /// Nothing buffered since the last flush
    SkippedEmpty,
}

/// Single-flight guard for window uploads.
///
/// At most one window is in transmission at any instant. A flush attempt
/// while busy is a no-op: the buffered audio simply merges into the next
/// window instead of queueing a backlog, and because no two windows are ever
/// in flight concurrently, responses arrive in send order.
#[derive(Debug, Default)]
pub(crate) struct UploadGate {
    busy: AtomicBool,
    next_sequence: AtomicU64,
    windows_sent: AtomicUsize,
    windows_failed: AtomicUsize,
}

impl UploadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the buffer into one window and send it, unless an upload is
    /// already outstanding or there is nothing to send.
    ///
    /// Only ever called from the session's driver task, so the busy check
    /// and the drain cannot interleave with another flush attempt.
    pub fn try_flush(self: &Arc<Self>, buffer: &mut ChunkBuffer, ctx: &UploadContext) -> FlushOutcome {
        if self.busy.load(Ordering::SeqCst) {
            return FlushOutcome::SkippedBusy;
        }

        let fragments = match buffer.drain() {
            Some(fragments) => fragments,
            None => return FlushOutcome::SkippedEmpty,
        };

        self.busy.store(true, Ordering::SeqCst);
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let window = UploadWindow::from_fragments(sequence, ctx.languages.clone(), fragments);
        let bytes = window.byte_len();

        let gate = Arc::clone(self);
        let ctx = ctx.clone();
        tokio::spawn(async move {
            gate.run_upload(window, ctx).await;
        });

        FlushOutcome::Sent { sequence, bytes }
    }

    async fn run_upload(self: Arc<Self>, window: UploadWindow, ctx: UploadContext) {
        let sequence = window.sequence;
        let chunk_bytes = window.byte_len();

        let sent_at = Instant::now();
        let result = ctx.transport.send_window(&window).await;
        let network_ms = sent_at.elapsed().as_millis() as u64;

        // The gate must never stay busy past a completed attempt, success
        // or failure, so release it before handling the result.
        self.busy.store(false, Ordering::SeqCst);

        match result {
            Ok(response) => {
                self.windows_sent.fetch_add(1, Ordering::SeqCst);

                if !ctx.live.load(Ordering::SeqCst) {
                    debug!(
                        "Discarding caption for superseded session {} (window {})",
                        ctx.session_id, sequence
                    );
                    return;
                }

                let metrics = WindowMetrics {
                    from_lang: response.from_lang.clone(),
                    to_lang: response.to_lang.clone(),
                    processing_ms: response.processing_ms,
                    network_ms,
                    chunk_bytes,
                };

                {
                    let mut transcript = ctx.transcript.lock().await;
                    transcript.apply(&response, metrics);
                }

                ctx.set_status_while_recording(STATUS_RECORDING).await;

                debug!(
                    "Window {} applied ({} bytes, processing={}ms, net={}ms)",
                    sequence, chunk_bytes, response.processing_ms, network_ms
                );
            }
            Err(e) => {
                // The window's audio is gone; no retry, no re-buffering
                self.windows_failed.fetch_add(1, Ordering::SeqCst);
                error!(
                    "Window {} dropped for session {}: {}",
                    sequence, ctx.session_id, e
                );

                if ctx.live.load(Ordering::SeqCst) {
                    ctx.set_status_while_recording(&status_for_error(&e)).await;
                }
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn windows_sent(&self) -> usize {
        self.windows_sent.load(Ordering::SeqCst)
    }

    pub fn windows_failed(&self) -> usize {
        self.windows_failed.load(Ordering::SeqCst)
    }
}

fn status_for_error(error: &TransportError) -> String {
    match error {
        TransportError::Network(_) => "Network error sending window.".to_string(),
        TransportError::Service { status, detail } => {
            format!("Service error ({}): {}", status, detail)
        }
        TransportError::Malformed(_) => "Service returned an unreadable response.".to_string(),
    }
}
