//! Intake configuration.
//!
//! The only external collaborator is the platform upload API; its base
//! URL comes from the environment (with `.env` support) or an explicit
//! override.

use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the platform API base URL.
pub const API_URL_VAR: &str = "COURSELOAD_API_URL";

/// Configuration for the upload pipeline.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Base URL of the platform API, without a trailing slash.
    pub api_url: String,
}

impl IntakeConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Load configuration from the environment (reads `.env` if present).
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let api_url = std::env::var(API_URL_VAR)
            .map_err(|_| ConfigError::MissingVar(API_URL_VAR.to_string()))?;

        if api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: API_URL_VAR.to_string(),
                message: "value is empty".to_string(),
            });
        }

        Ok(Self::new(api_url))
    }

    /// Absolute URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = IntakeConfig::new("https://api.example.com/");
        assert_eq!(
            config.endpoint("/api/uploads/lessons"),
            "https://api.example.com/api/uploads/lessons"
        );
    }
}
