// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Credentials used by the login exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_verification_code")]
    pub verification_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_color")]
    pub color: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.auth.username.trim().is_empty() {
            bail!("auth.username must not be empty");
        }

        let code = &self.auth.verification_code;
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            bail!("auth.verification_code must be six digits, got {:?}", code);
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            bail!("log_level {:?} is not a tracing level", self.log_level);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            output: OutputConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            verification_code: default_verification_code(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: default_color(),
        }
    }
}

fn default_username() -> String {
    "kennedy.mweene".to_string()
}

fn default_password() -> String {
    "test".to_string()
}

fn default_verification_code() -> String {
    "000000".to_string()
}

fn default_color() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}
