// Live capture demo: microphone to live transcript/translation
//
// Drives a capture session directly (no HTTP control surface) against a
// running captioning service and prints the growing transcript every window.
//
// Prerequisites:
// - A captioning service reachable at the endpoint below
// - Microphone permission for the terminal/IDE
//
// Usage: cargo run --example live_capture [-- <endpoint>]

use anyhow::Result;
use polyglot_captions::{
    CaptureConfig, CaptureDeviceFactory, CaptureSource, CaptureSession, CaptionTransport,
    HttpCaptionClient, LanguagePair, SessionConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8000/api/caption".to_string());

    info!("Captioning endpoint: {}", endpoint);

    let client = HttpCaptionClient::new(endpoint, None)?;
    let transport: Arc<dyn CaptionTransport> = Arc::new(client);

    let config = SessionConfig::new(LanguagePair::new("en", "es"));
    let session = CaptureSession::new(config, transport);

    let device = CaptureDeviceFactory::create(CaptureSource::Microphone, CaptureConfig::default())?;
    session.start(device).await?;

    info!("Recording for 15 seconds...");

    for _ in 0..5 {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let transcript = session.transcript().await;
        println!("original:   {}", transcript.original_text);
        println!("translated: {}", transcript.translated_text);
        if let Some(metrics) = transcript.last_metrics {
            println!(
                "pair={}->{} processing={}ms net={}ms chunk={}",
                metrics.from_lang,
                metrics.to_lang,
                metrics.processing_ms,
                metrics.network_ms,
                metrics.chunk_bytes
            );
        }
    }

    let stats = session.stop().await;
    info!(
        "Stopped: {} windows sent, {} failed, {:.1}s",
        stats.windows_sent, stats.windows_failed, stats.duration_secs
    );

    Ok(())
}
