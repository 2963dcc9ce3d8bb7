#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::TomlConfig;

use crate::app::render::OutputFormat;
use crate::core::optimistic::OnFailure;
use crate::core::session::Session;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClinicError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;

/// Effective settings: command-line flags layered over the config file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub on_failure: OnFailure,
    pub output_format: OutputFormat,
    pub session: Option<Session>,
}

impl AppConfig {
    pub fn layered(
        file: Option<&TomlConfig>,
        api_url: Option<String>,
        format: Option<OutputFormat>,
    ) -> Result<Self> {
        let api_base_url = api_url
            .or_else(|| file.map(|f| f.api_base_url().to_string()))
            .ok_or_else(|| ClinicError::MissingConfigError {
                field: "api.base_url".to_string(),
            })?;

        let config = Self {
            api_base_url,
            request_timeout: file.map(|f| f.request_timeout()).unwrap_or(Duration::from_secs(
                toml_config::DEFAULT_TIMEOUT_SECONDS,
            )),
            on_failure: file.map(|f| f.on_failure()).unwrap_or_default(),
            output_format: format
                .or_else(|| file.map(|f| f.output_format()))
                .unwrap_or_default(),
            session: file.and_then(|f| f.session()),
        };
        config.validate()?;
        Ok(config)
    }
}

impl ConfigProvider for AppConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn on_failure(&self) -> OnFailure {
        self.on_failure
    }

    fn output_format(&self) -> OutputFormat {
        self.output_format
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api_base_url)?;
        validation::validate_range("api.timeout_seconds", self.request_timeout.as_secs(), 1, 300)
    }
}
