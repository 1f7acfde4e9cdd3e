use anyhow::{Context, Result};
use clap::Parser;
use polyglot_captions::{create_router, AppState, CaptureSettings, Config, HttpCaptionClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "polyglot-captions", about = "Live transcription and translation capture service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/polyglot-captions")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Captioning endpoint: {}", cfg.caption.endpoint);

    let client = HttpCaptionClient::new(cfg.caption.endpoint.clone(), cfg.caption.auth_token.clone())
        .context("Failed to build caption client")?;
    let transport: Arc<dyn polyglot_captions::CaptionTransport> = Arc::new(client);

    let state = AppState::new(
        transport,
        CaptureSettings {
            window_period: Duration::from_millis(cfg.capture.window_ms),
            fragment_duration_ms: cfg.capture.fragment_ms,
        },
    );

    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
