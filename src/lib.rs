pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;

pub use audio::{
    AudioFragment, CaptureConfig, CaptureDevice, CaptureDeviceFactory, CaptureSource, DeviceError,
    MicrophoneDevice, WavReplayDevice,
};
pub use config::Config;
pub use error::SessionError;
pub use http::{create_router, AppState, CaptureSettings};
pub use session::{
    CaptureSession, ChunkBuffer, LanguagePair, SessionConfig, SessionState, SessionStats,
    TranscriptAccumulator, TranscriptState, UploadWindow, WindowMetrics,
};
pub use transport::{CaptionResponse, CaptionTransport, HttpCaptionClient, TransportError};
