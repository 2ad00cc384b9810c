use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// Engine type tags are checked when the engine pool is built, since the
    /// set of supported tags belongs to the TTS crate.
    ///
    /// # Errors
    ///
    /// Returns an error if no engine is configured or the served engine
    /// name does not refer to a configured engine
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tts.engines.is_empty() {
            anyhow::bail!("at least one TTS engine must be configured under [tts.engines]");
        }

        if !self.tts.engines.contains_key(&self.tts.engine) {
            anyhow::bail!(
                "tts.engine refers to '{}', which is not defined under [tts.engines]",
                self.tts.engine
            );
        }

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use crate::{Config, ExportProtocol};

    const MINIMAL: &str = r#"
        [tts.engines.tts]
        engine_type = "python"
        base_url = "http://127.0.0.1:8091"
    "#;

    #[test]
    fn minimal_config() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert!(config.server.listen_address.is_none());
        assert!(config.server.health.enabled);
        assert_eq!(config.server.health.path, "/health");
        assert!(config.telemetry.is_none());
        assert_eq!(config.tts.engine, "tts");
        assert_eq!(config.tts.engines.len(), 1);
    }

    #[test]
    fn full_config() {
        let raw = r#"
            [server]
            listen_address = "127.0.0.1:8090"

            [server.health]
            path = "/healthz"

            [tts]
            engine = "streaming"

            [tts.engines.offline]
            engine_type = "inference"
            base_url = "http://127.0.0.1:8091"

            [tts.engines.streaming]
            engine_type = "online-onnx"
            base_url = "http://127.0.0.1:8092"
            api_key = "worker-key"
            sample_rate = 24000

            [telemetry]
            service_name = "tts-edge"

            [telemetry.exporter]
            endpoint = "http://collector:4318"
            protocol = "http_proto"
        "#;

        let config = Config::from_toml(raw).unwrap();

        assert_eq!(config.server.listen_address.unwrap().port(), 8090);
        assert_eq!(config.server.health.path, "/healthz");
        assert_eq!(config.tts.engine, "streaming");

        let streaming = &config.tts.engines["streaming"];
        assert_eq!(streaming.engine_type, "online-onnx");
        assert_eq!(streaming.api_key.as_ref().unwrap().expose_secret(), "worker-key");

        let telemetry = config.telemetry.unwrap();
        assert_eq!(telemetry.service_name, "tts-edge");
        let exporter = telemetry.span_exporter().unwrap();
        assert_eq!(exporter.protocol, ExportProtocol::HttpProto);
    }

    #[test]
    fn no_engines_is_rejected() {
        let err = Config::from_toml("[server]\n").unwrap_err();
        assert!(err.to_string().contains("at least one TTS engine"));
    }

    #[test]
    fn unknown_served_engine_is_rejected() {
        let raw = format!("[tts]\nengine = \"missing\"\n{MINIMAL}");
        let err = Config::from_toml(&raw).unwrap_err();
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn relative_health_path_is_rejected() {
        let raw = format!("[server.health]\npath = \"health\"\n{MINIMAL}");
        let err = Config::from_toml(&raw).unwrap_err();
        assert!(err.to_string().contains("server.health.path"));
    }

    #[test]
    fn load_expands_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [tts.engines.tts]
            engine_type = "online"
            base_url = "{{{{ env.SPEECHGATE_TEST_WORKER }}}}"
            "#
        )
        .unwrap();

        temp_env::with_var("SPEECHGATE_TEST_WORKER", Some("http://worker:9000"), || {
            let config = Config::load(file.path()).unwrap();
            assert_eq!(config.tts.engines["tts"].base_url.as_str(), "http://worker:9000/");
        });
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(std::path::Path::new("/nonexistent/speechgate.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
