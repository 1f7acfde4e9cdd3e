pub mod device;
pub mod microphone;
pub mod replay;

pub use device::{
    AudioFragment, CaptureConfig, CaptureDevice, CaptureDeviceFactory, CaptureSource, DeviceError,
};
pub use microphone::MicrophoneDevice;
pub use replay::WavReplayDevice;
