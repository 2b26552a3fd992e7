//! Runtime configuration of the backend.
//!
//! Values come from `MAILSFLOW_*` environment variables, optionally seeded
//! from a `.env` file in the working directory. Anything not set falls back to
//! the defaults of a local single-user install.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite database holding templates, files and the outbox.
    pub db_path: PathBuf,
    /// Directory where uploaded contact files are stored.
    pub data_dir: PathBuf,
    /// Default number of rows returned by the file preview endpoint.
    pub preview_rows: usize,
    pub open_browser: bool,
    /// How long a finished campaign job stays available to status polls.
    pub job_retention: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: PathBuf::from("mailsflow.sqlite"),
            data_dir: PathBuf::from("data"),
            preview_rows: 20,
            open_browser: true,
            job_retention: Duration::from_secs(3600),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(host) = lookup("MAILSFLOW_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("MAILSFLOW_PORT") {
            config.port = parse("MAILSFLOW_PORT", port)?;
        }
        if let Some(path) = lookup("MAILSFLOW_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("MAILSFLOW_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(rows) = lookup("MAILSFLOW_PREVIEW_ROWS") {
            config.preview_rows = parse("MAILSFLOW_PREVIEW_ROWS", rows)?;
        }
        if let Some(secs) = lookup("MAILSFLOW_JOB_RETENTION_SECS") {
            config.job_retention =
                Duration::from_secs(parse("MAILSFLOW_JOB_RETENTION_SECS", secs)?);
        }
        if let Some(open) = lookup("MAILSFLOW_OPEN_BROWSER") {
            config.open_browser = match open.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "MAILSFLOW_OPEN_BROWSER",
                        value: open,
                    })
                }
            };
        }

        Ok(config)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |key: &'static str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.url(), "http://127.0.0.1:8080");
        assert_eq!(config.preview_rows, 20);
        assert_eq!(config.job_retention, Duration::from_secs(3600));
        assert!(config.open_browser);
    }

    #[test]
    fn overrides_from_lookup() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MAILSFLOW_PORT", "9000"),
            ("MAILSFLOW_DATA_DIR", "/tmp/uploads"),
            ("MAILSFLOW_OPEN_BROWSER", "no"),
            ("MAILSFLOW_JOB_RETENTION_SECS", "90"),
        ]))
        .unwrap();
        assert_eq!(config.job_retention, Duration::from_secs(90));
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/uploads"));
        assert!(!config.open_browser);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = AppConfig::from_lookup(lookup(&[("MAILSFLOW_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("MAILSFLOW_PORT"));
    }
}
