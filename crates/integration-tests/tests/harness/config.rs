//! Programmatic configuration builder for integration tests

use std::{net::SocketAddr, time::Duration};

use secrecy::SecretString;
use speechgate_config::{Config, HealthConfig, ServerConfig, TtsConfig, TtsEngineConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                tts: TtsConfig::default(),
                telemetry: None,
            },
        }
    }

    /// Add an engine of `engine_type` backed by the worker at `base_url`
    ///
    /// The first engine added becomes the served engine.
    pub fn with_engine(mut self, name: &str, engine_type: &str, base_url: &str) -> Self {
        if self.config.tts.engines.is_empty() {
            self.config.tts.engine = name.to_owned();
        }

        self.config.tts.engines.insert(
            name.to_owned(),
            TtsEngineConfig {
                engine_type: engine_type.to_owned(),
                base_url: base_url.parse().expect("valid URL"),
                api_key: Some(SecretString::from("worker-key")),
                sample_rate: 24_000,
                connect_timeout: Duration::from_secs(1),
            },
        );
        self
    }

    /// Serve a specific engine by name
    pub fn serving(mut self, name: &str) -> Self {
        self.config.tts.engine = name.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
