use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine configuration for formflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormflowConfig {
    /// Pause between an accepted submission and the auto-advance, in
    /// milliseconds. Exists so the presentation layer can show a success
    /// indication before the context switches.
    pub advance_delay_ms: u64,
    /// Default log level when RUST_LOG is not set.
    pub log_level: String,
}

impl Default for FormflowConfig {
    fn default() -> Self {
        Self {
            advance_delay_ms: 2000,
            log_level: "info".to_string(),
        }
    }
}

impl FormflowConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. formflow.toml in the working directory, if present
    /// 3. Environment variables prefixed with FORMFLOW_
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("advance_delay_ms", defaults.advance_delay_ms)?
            .set_default("log_level", defaults.log_level)?;

        if Path::new("formflow.toml").exists() {
            builder = builder.add_source(File::with_name("formflow"));
        }

        builder = builder.add_source(Environment::with_prefix("FORMFLOW").try_parsing(true));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}
