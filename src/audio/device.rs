use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::mpsc;

/// One opaque encoded audio fragment emitted by a capture device.
///
/// The session layer never inspects the payload; fragments are appended in
/// arrival order and concatenated into upload windows as-is.
#[derive(Debug, Clone)]
pub struct AudioFragment {
    /// Encoded audio bytes (format is the device's concern)
    pub payload: Vec<u8>,
    /// Milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Errors raised by capture devices
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("no default input device available")]
    NoInputDevice,

    #[error("audio capture permission denied")]
    PermissionDenied,

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("device is already capturing")]
    AlreadyCapturing,

    #[error("device error: {0}")]
    Backend(String),
}

/// Configuration for capture devices
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Duration of each emitted fragment in milliseconds (affects latency)
    pub fragment_duration_ms: u64,
    /// Capacity of the fragment channel handed to the session
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fragment_duration_ms: 100, // 100ms fragments
            channel_capacity: 100,
        }
    }
}

/// Audio capture device trait
///
/// Implementations:
/// - Microphone: cpal default input device (all platforms)
/// - File: replay a WAV file in real time (for demos/batch testing)
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device and start capturing.
    ///
    /// Returns a channel receiver that will receive audio fragments at
    /// short micro-intervals until the device is released.
    async fn acquire(&mut self) -> Result<mpsc::Receiver<AudioFragment>, DeviceError>;

    /// Release the device and stop hardware capture
    async fn release(&mut self) -> Result<(), DeviceError>;

    /// Check if the device is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Default microphone input
    Microphone,
    /// WAV file replayed in real time
    File(PathBuf),
}

/// Capture device factory
pub struct CaptureDeviceFactory;

impl CaptureDeviceFactory {
    /// Create a capture device for the given source
    pub fn create(
        source: CaptureSource,
        config: CaptureConfig,
    ) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        match source {
            CaptureSource::Microphone => {
                let device = super::microphone::MicrophoneDevice::new(config);
                Ok(Box::new(device))
            }
            CaptureSource::File(path) => {
                let device = super::replay::WavReplayDevice::new(path, config);
                Ok(Box::new(device))
            }
        }
    }
}
