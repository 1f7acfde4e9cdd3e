use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub capture: CaptureSection,
    pub caption: CaptionSection,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct CaptureSection {
    /// Period between flush attempts in milliseconds
    pub window_ms: u64,
    /// Duration of each device fragment in milliseconds
    pub fragment_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct CaptionSection {
    /// Captioning endpoint URL
    pub endpoint: String,
    /// Bearer credential attached to every upload, if set
    pub auth_token: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
