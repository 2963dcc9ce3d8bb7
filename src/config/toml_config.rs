use crate::app::render::OutputFormat;
use crate::core::optimistic::OnFailure;
use crate::core::session::Session;
use crate::domain::model::Role;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClinicError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub session: Option<SessionConfig>,
    pub ui: Option<UiConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

/// Fixed identity, mostly for scripted use. Wins over the stored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub on_failure: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| ClinicError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ClinicError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(session) = &self.session {
            validation::validate_non_empty_string("session.token", &session.token)?;
            validation::validate_non_empty_string("session.user_id", &session.user_id)?;
        }

        if let Some(policy) = self.ui.as_ref().and_then(|u| u.on_failure.as_deref()) {
            policy
                .parse::<OnFailure>()
                .map_err(|reason| ClinicError::InvalidConfigValueError {
                    field: "ui.on_failure".to_string(),
                    value: policy.to_string(),
                    reason,
                })?;
        }

        if let Some(format) = self.output.as_ref().and_then(|o| o.format.as_deref()) {
            format
                .parse::<OutputFormat>()
                .map_err(|reason| ClinicError::InvalidConfigValueError {
                    field: "output.format".to_string(),
                    value: format.to_string(),
                    reason,
                })?;
        }

        Ok(())
    }

    /// Session pinned in the file, if any.
    pub fn session(&self) -> Option<Session> {
        self.session.as_ref().map(|s| Session {
            token: s.token.clone(),
            user_id: s.user_id.clone(),
            role: s.role,
        })
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn on_failure(&self) -> OnFailure {
        self.ui
            .as_ref()
            .and_then(|u| u.on_failure.as_deref())
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }

    fn output_format(&self) -> OutputFormat {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
