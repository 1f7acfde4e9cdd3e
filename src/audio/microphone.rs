//! Microphone capture device using cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::device::{AudioFragment, CaptureConfig, CaptureDevice, DeviceError};

/// Converts native samples to 16-bit PCM for the wire.
trait ToPcmSample: Copy {
    fn to_pcm_i16(self) -> i16;
}

impl ToPcmSample for i8 {
    #[inline]
    fn to_pcm_i16(self) -> i16 {
        (self as i16) << 8
    }
}

impl ToPcmSample for i16 {
    #[inline]
    fn to_pcm_i16(self) -> i16 {
        self
    }
}

impl ToPcmSample for i32 {
    #[inline]
    fn to_pcm_i16(self) -> i16 {
        (self >> 16) as i16
    }
}

impl ToPcmSample for f32 {
    #[inline]
    fn to_pcm_i16(self) -> i16 {
        (self.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
    }
}

// cpal streams are !Send; the stream is only ever created and dropped from
// the device owner, never shared across threads while alive.
struct SafeStream {
    _stream: cpal::Stream,
}

unsafe impl Send for SafeStream {}
unsafe impl Sync for SafeStream {}

/// Groups raw callback samples into fixed-duration PCM fragments and
/// forwards them on the session's fragment channel.
struct FragmentAssembler {
    tx: mpsc::Sender<AudioFragment>,
    pending: Vec<u8>,
    fragment_bytes: usize,
    flushed_frames: u64,
    sample_rate: u32,
    channels: u16,
}

impl FragmentAssembler {
    fn new(
        tx: mpsc::Sender<AudioFragment>,
        sample_rate: u32,
        channels: u16,
        fragment_duration_ms: u64,
    ) -> Self {
        let frames = sample_rate as u64 * fragment_duration_ms / 1000;
        let fragment_bytes = (frames * channels as u64 * 2).max(2) as usize;

        Self {
            tx,
            pending: Vec::with_capacity(fragment_bytes),
            fragment_bytes,
            flushed_frames: 0,
            sample_rate,
            channels,
        }
    }

    /// Runs on the audio callback thread; must never block.
    fn push_samples<T: ToPcmSample>(&mut self, data: &[T]) {
        for &sample in data {
            self.pending
                .extend_from_slice(&sample.to_pcm_i16().to_le_bytes());
        }

        while self.pending.len() >= self.fragment_bytes {
            let rest = self.pending.split_off(self.fragment_bytes);
            let payload = std::mem::replace(&mut self.pending, rest);

            let timestamp_ms = self.flushed_frames * 1000 / self.sample_rate as u64;
            self.flushed_frames += (payload.len() / (self.channels as usize * 2)) as u64;

            let fragment = AudioFragment {
                payload,
                timestamp_ms,
            };

            if self.tx.try_send(fragment).is_err() {
                warn!("Fragment channel full or closed, dropping microphone fragment");
            }
        }
    }
}

/// Microphone capture device
///
/// Emits 16-bit little-endian PCM fragments from the default input device.
pub struct MicrophoneDevice {
    config: CaptureConfig,
    stream: Option<SafeStream>,
}

impl MicrophoneDevice {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MicrophoneDevice {
    async fn acquire(&mut self) -> Result<mpsc::Receiver<AudioFragment>, DeviceError> {
        if self.stream.is_some() {
            return Err(DeviceError::AlreadyCapturing);
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(DeviceError::NoInputDevice)?;

        let supported = device
            .default_input_config()
            .map_err(|e| DeviceError::Backend(e.to_string()))?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let stream_config = supported.config();

        info!(
            "Acquiring microphone ({}Hz, {} channels, {:?})",
            sample_rate,
            channels,
            supported.sample_format()
        );

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let mut assembler = FragmentAssembler::new(
            tx,
            sample_rate,
            channels,
            self.config.fragment_duration_ms,
        );

        let err_fn = move |err: cpal::StreamError| {
            tracing::error!("Microphone stream error: {}", err);
        };

        let stream_result = match supported.sample_format() {
            cpal::SampleFormat::I8 => device.build_input_stream(
                &stream_config,
                move |data: &[i8], _: &_| assembler.push_samples(data),
                err_fn,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &_| assembler.push_samples(data),
                err_fn,
                None,
            ),
            cpal::SampleFormat::I32 => device.build_input_stream(
                &stream_config,
                move |data: &[i32], _: &_| assembler.push_samples(data),
                err_fn,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &_| assembler.push_samples(data),
                err_fn,
                None,
            ),
            other => {
                return Err(DeviceError::UnsupportedFormat(format!("{:?}", other)));
            }
        };

        let stream = stream_result.map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => DeviceError::NoInputDevice,
            other => DeviceError::Backend(other.to_string()),
        })?;

        stream
            .play()
            .map_err(|e| DeviceError::Backend(e.to_string()))?;

        self.stream = Some(SafeStream { _stream: stream });

        info!("Microphone capture started");

        Ok(rx)
    }

    async fn release(&mut self) -> Result<(), DeviceError> {
        if let Some(stream) = self.stream.take() {
            // Dropping the stream stops hardware capture and closes the
            // fragment channel via the assembler.
            drop(stream);
            info!("Microphone released");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    fn name(&self) -> &str {
        "microphone"
    }
}
