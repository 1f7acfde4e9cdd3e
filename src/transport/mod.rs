pub mod client;
pub mod types;

pub use client::{CaptionTransport, HttpCaptionClient, TransportError};
pub use types::{CaptionResponse, ServiceErrorBody};
