use serde::Deserialize;
use std::env::vars;
use thiserror::Error;

/// Endpoint base used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";

const UPLOAD_PATH: &str = "/api/books/upload";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] serde_env::Error),
}

/// Environment variables consulted by [`UploadConfig::from_env`].
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    palabra_api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub api_base_url: String,
}

impl UploadConfig {
    /// An empty base falls back to [`DEFAULT_API_BASE_URL`].
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self {
                api_base_url: trimmed.to_owned(),
            }
        }
    }

    /// Reads `PALABRA_API_URL` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(vars())
    }

    fn from_vars<I, S>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let raw: RawConfig = serde_env::from_iter(vars)?;
        let config = match raw.palabra_api_url {
            Some(url) => Self::new(url),
            None => Self::default(),
        };
        log::debug!("Upload endpoint base: {}", config.api_base_url);
        Ok(config)
    }

    pub fn upload_url(&self) -> String {
        format!("{}{UPLOAD_PATH}", self.api_base_url)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_api() {
        let config = UploadConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:4000");
        assert_eq!(config.upload_url(), "http://localhost:4000/api/books/upload");
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = UploadConfig::new("https://palabra.example.com//");
        assert_eq!(
            config.upload_url(),
            "https://palabra.example.com/api/books/upload"
        );
    }

    #[test]
    fn empty_base_falls_back_to_default() {
        assert_eq!(UploadConfig::new("   "), UploadConfig::default());
    }

    #[test]
    fn reads_api_url_from_env_vars() {
        let config = UploadConfig::from_vars(vec![
            ("PALABRA_API_URL", "http://api.internal:8080"),
            ("HOME", "/root"),
        ])
        .expect("config should load");
        assert_eq!(config.api_base_url, "http://api.internal:8080");
    }

    #[test]
    fn missing_env_var_uses_default() {
        let config =
            UploadConfig::from_vars(Vec::<(&str, &str)>::new()).expect("config should load");
        assert_eq!(config, UploadConfig::default());
    }

    #[test]
    fn empty_env_var_uses_default() {
        let config = UploadConfig::from_vars(vec![("PALABRA_API_URL", "")])
            .expect("config should load");
        assert_eq!(config, UploadConfig::default());
    }
}
