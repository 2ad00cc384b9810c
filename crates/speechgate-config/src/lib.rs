#![allow(clippy::must_use_candidate)]

mod env;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;
pub mod tts;

use serde::Deserialize;

pub use health::*;
pub use server::*;
pub use telemetry::{ExportProtocol, ExporterConfig, TelemetryConfig, TracingConfig};
pub use tts::*;

/// Top-level speechgate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// TTS engine pool configuration
    #[serde(default)]
    pub tts: TtsConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
