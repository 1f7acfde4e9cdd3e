use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::audio::CaptureDevice;
use crate::error::SessionError;
use crate::transport::CaptionTransport;

use super::buffer::ChunkBuffer;
use super::config::{LanguagePair, SessionConfig};
use super::gate::{FlushOutcome, UploadContext, UploadGate};
use super::stats::SessionStats;
use super::transcript::{TranscriptAccumulator, TranscriptState};

pub(crate) const STATUS_IDLE: &str = "Idle.";
pub(crate) const STATUS_REQUESTING: &str = "Requesting microphone…";
pub(crate) const STATUS_RECORDING: &str = "Recording…";
pub(crate) const STATUS_STOPPING: &str = "Stopping…";
pub(crate) const STATUS_STOPPED: &str = "Stopped.";

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Acquiring,
    Recording,
    Stopping,
    Stopped,
    Failed,
}

/// One end-to-end capture attempt: device acquisition, periodic window
/// flushing, and incremental transcript accumulation.
///
/// Audio fragments, flush timer ticks, and the stop signal are all consumed
/// by a single driver task, so the chunk buffer is only ever touched from
/// one timeline. Uploads run as separate tasks behind the single-flight
/// upload gate; fragment collection continues while one is outstanding.
pub struct CaptureSession {
    config: SessionConfig,
    transport: Arc<dyn CaptionTransport>,
    state: Arc<Mutex<SessionState>>,
    status: Arc<Mutex<String>>,
    transcript: Arc<Mutex<TranscriptAccumulator>>,
    gate: Arc<UploadGate>,

    /// Cleared when a newer session supersedes this one
    live: Arc<AtomicBool>,

    started_at: Arc<Mutex<Option<DateTime<Utc>>>>,
    stop_tx: Arc<Mutex<Option<watch::Sender<bool>>>>,
    driver_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CaptureSession {
    pub fn new(config: SessionConfig, transport: Arc<dyn CaptionTransport>) -> Self {
        Self {
            config,
            transport,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            status: Arc::new(Mutex::new(STATUS_IDLE.to_string())),
            transcript: Arc::new(Mutex::new(TranscriptAccumulator::new())),
            gate: Arc::new(UploadGate::new()),
            live: Arc::new(AtomicBool::new(true)),
            started_at: Arc::new(Mutex::new(None)),
            stop_tx: Arc::new(Mutex::new(None)),
            driver_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start capturing from the given device.
    ///
    /// Validates the language pair before touching the device; a start
    /// request while the session is not `Idle` is a no-op.
    pub async fn start(&self, mut device: Box<dyn CaptureDevice>) -> Result<(), SessionError> {
        {
            let state = self.state.lock().await;
            if *state != SessionState::Idle {
                warn!(
                    "Start requested for session {} in state {:?}, ignoring",
                    self.config.session_id, *state
                );
                return Ok(());
            }
        }

        if !self.config.languages.is_valid() {
            *self.status.lock().await =
                "Source and target language cannot be the same.".to_string();
            return Err(SessionError::InvalidConfiguration);
        }

        info!(
            "Starting capture session {} ({})",
            self.config.session_id, self.config.languages
        );

        self.set_state(SessionState::Acquiring, STATUS_REQUESTING).await;

        let mut fragments = match device.acquire().await {
            Ok(rx) => rx,
            Err(e) => {
                error!(
                    "Failed to acquire {} for session {}: {}",
                    device.name(),
                    self.config.session_id,
                    e
                );
                self.set_state(SessionState::Failed, &e.to_string()).await;
                return Err(SessionError::Device(e));
            }
        };

        self.transcript.lock().await.reset();
        *self.started_at.lock().await = Some(Utc::now());

        let (stop_tx, mut stop_rx) = watch::channel(false);
        *self.stop_tx.lock().await = Some(stop_tx);

        self.set_state(SessionState::Recording, STATUS_RECORDING).await;

        let ctx = UploadContext {
            session_id: self.config.session_id.clone(),
            languages: self.config.languages.clone(),
            transport: Arc::clone(&self.transport),
            transcript: Arc::clone(&self.transcript),
            state: Arc::clone(&self.state),
            status: Arc::clone(&self.status),
            live: Arc::clone(&self.live),
        };

        let gate = Arc::clone(&self.gate);
        let state = Arc::clone(&self.state);
        let status = Arc::clone(&self.status);
        let window_period = self.config.window_period;
        let session_id = self.config.session_id.clone();

        let driver = tokio::spawn(async move {
            let mut buffer = ChunkBuffer::new();

            // First flush fires one full period after recording begins.
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + window_period, window_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!("Capture driver started for session {}", session_id);

            loop {
                // Stop wins over a simultaneously ready tick, and pending
                // fragments are buffered before a tick can flush.
                tokio::select! {
                    biased;

                    _ = stop_rx.changed() => {
                        break;
                    }
                    maybe_fragment = fragments.recv() => {
                        match maybe_fragment {
                            Some(fragment) => buffer.append(fragment),
                            None => {
                                warn!("Fragment stream ended for session {}", session_id);
                                break;
                            }
                        }
                    }
                    _ = ticker.tick() => {
                        match gate.try_flush(&mut buffer, &ctx) {
                            FlushOutcome::Sent { sequence, bytes } => {
                                debug!("Flushed window {} ({} bytes)", sequence, bytes);
                            }
                            FlushOutcome::SkippedBusy => {
                                debug!("Upload in flight, window deferred");
                            }
                            FlushOutcome::SkippedEmpty => {
                                debug!("No audio buffered, flush skipped");
                            }
                        }
                    }
                }
            }

            // No further ticks from here on: audio collected after the last
            // completed flush is discarded, not sent.
            if !buffer.is_empty() {
                debug!(
                    "Discarding {} trailing fragments ({} bytes) for session {}",
                    buffer.len(),
                    buffer.byte_len(),
                    session_id
                );
            }

            if let Err(e) = device.release().await {
                error!("Failed to release capture device: {}", e);
            }

            *state.lock().await = SessionState::Stopped;
            *status.lock().await = STATUS_STOPPED.to_string();

            info!("Capture session {} stopped", session_id);
        });

        *self.driver_handle.lock().await = Some(driver);

        Ok(())
    }

    /// Stop the session.
    ///
    /// Cancels future flushes immediately and releases the device. Any
    /// in-flight upload is left to complete or fail on its own. Idempotent:
    /// stopping a session that is not recording is a no-op.
    pub async fn stop(&self) -> SessionStats {
        let should_signal = {
            let mut state = self.state.lock().await;
            if *state == SessionState::Recording {
                *state = SessionState::Stopping;
                true
            } else {
                false
            }
        };

        if should_signal {
            *self.status.lock().await = STATUS_STOPPING.to_string();
            info!("Stopping capture session {}", self.config.session_id);

            if let Some(stop_tx) = self.stop_tx.lock().await.take() {
                let _ = stop_tx.send(true);
            }

            if let Some(handle) = self.driver_handle.lock().await.take() {
                if let Err(e) = handle.await {
                    error!("Capture driver panicked: {}", e);
                }
            }
        } else {
            debug!(
                "Stop requested for session {} but it is not recording",
                self.config.session_id
            );
        }

        self.stats().await
    }

    /// Mark this session as superseded. Results of uploads still in flight
    /// are discarded instead of being applied to the transcript.
    pub fn invalidate(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Latest user-facing status line
    pub async fn status_line(&self) -> String {
        self.status.lock().await.clone()
    }

    /// Snapshot of the accumulated transcript
    pub async fn transcript(&self) -> TranscriptState {
        self.transcript.lock().await.snapshot()
    }

    /// Current session statistics
    pub async fn stats(&self) -> SessionStats {
        let state = *self.state.lock().await;
        let status_line = self.status.lock().await.clone();
        let started_at = *self.started_at.lock().await;

        let duration_secs = started_at
            .map(|t| Utc::now().signed_duration_since(t).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        SessionStats {
            session_id: self.config.session_id.clone(),
            state,
            status_line,
            languages: self.config.languages.clone(),
            started_at,
            duration_secs,
            windows_sent: self.gate.windows_sent(),
            windows_failed: self.gate.windows_failed(),
            upload_in_flight: self.gate.is_busy(),
            windows_applied: self.transcript.lock().await.windows_applied(),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.config.languages
    }

    async fn set_state(&self, next: SessionState, message: &str) {
        *self.state.lock().await = next;
        *self.status.lock().await = message.to_string();
    }
}
