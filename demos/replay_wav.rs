// WAV replay demo: feed a recorded file through a capture session
//
// Replays a WAV file as if it were live microphone input, which makes it
// easy to exercise the windowing/upload pipeline without a microphone.
//
// Usage: cargo run --example replay_wav -- <file.wav> [endpoint]

use anyhow::{bail, Result};
use polyglot_captions::{
    CaptureConfig, CaptureDeviceFactory, CaptureSource, CaptureSession, CaptionTransport,
    HttpCaptionClient, LanguagePair, SessionConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("Usage: replay_wav <file.wav> [endpoint]"),
    };
    let endpoint = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:8000/api/caption".to_string());

    let client = HttpCaptionClient::new(endpoint, None)?;
    let transport: Arc<dyn CaptionTransport> = Arc::new(client);

    let config = SessionConfig::new(LanguagePair::new("en", "es"));
    let session = CaptureSession::new(config, transport);

    let device = CaptureDeviceFactory::create(
        CaptureSource::File(path.clone()),
        CaptureConfig::default(),
    )?;
    session.start(device).await?;

    info!("Replaying {}", path.display());

    // Poll until the replay device runs out of audio
    loop {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let stats = session.stats().await;
        let transcript = session.transcript().await;
        println!("[{:?}] {}", stats.state, transcript.original_text);

        if stats.state != polyglot_captions::SessionState::Recording {
            break;
        }
    }

    let stats = session.stop().await;
    info!("Done: {} windows sent", stats.windows_sent);

    Ok(())
}
