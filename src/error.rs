use thiserror::Error;

use crate::audio::DeviceError;

/// Errors that end a start attempt before any audio is captured.
///
/// Per-window transport and service failures are deliberately not part of
/// this enum: they are local to one upload window, surfaced through the
/// session status line, and never tear the session down.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("source and target language must differ")]
    InvalidConfiguration,

    #[error("capture device: {0}")]
    Device(#[from] DeviceError),
}
