//! WAV file replay device for demos and batch testing.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hound::WavReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::device::{AudioFragment, CaptureConfig, CaptureDevice, DeviceError};

/// Replays a WAV file as timed PCM fragments, as if it were a live
/// microphone. Capture ends when the file runs out or the device is
/// released, whichever comes first.
pub struct WavReplayDevice {
    path: PathBuf,
    config: CaptureConfig,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl WavReplayDevice {
    pub fn new(path: PathBuf, config: CaptureConfig) -> Self {
        Self {
            path,
            config,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for WavReplayDevice {
    async fn acquire(&mut self) -> Result<mpsc::Receiver<AudioFragment>, DeviceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(DeviceError::AlreadyCapturing);
        }

        let reader = WavReader::open(&self.path)
            .map_err(|e| DeviceError::Backend(format!("{}: {}", self.path.display(), e)))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DeviceError::Backend(format!("failed to read samples: {}", e)))?;

        info!(
            "Replaying {}: {}Hz, {} channels, {} samples",
            self.path.display(),
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        let fragment_duration = Duration::from_millis(self.config.fragment_duration_ms);
        let samples_per_fragment = (spec.sample_rate as u64
            * spec.channels as u64
            * self.config.fragment_duration_ms
            / 1000)
            .max(1) as usize;

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        let fragment_ms = self.config.fragment_duration_ms;

        let task = tokio::spawn(async move {
            let mut timestamp_ms = 0u64;

            for chunk in samples.chunks(samples_per_fragment) {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                tokio::time::sleep(fragment_duration).await;

                let payload: Vec<u8> = chunk.iter().flat_map(|s| s.to_le_bytes()).collect();
                let fragment = AudioFragment {
                    payload,
                    timestamp_ms,
                };
                timestamp_ms += fragment_ms;

                if tx.send(fragment).await.is_err() {
                    warn!("Fragment channel closed, stopping WAV replay");
                    break;
                }
            }

            running.store(false, Ordering::SeqCst);
            info!("WAV replay finished");
        });

        self.task = Some(task);

        Ok(rx)
    }

    async fn release(&mut self) -> Result<(), DeviceError> {
        self.running.store(false, Ordering::SeqCst);

        if let Some(task) = self.task.take() {
            task.abort();
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "wav-replay"
    }
}
