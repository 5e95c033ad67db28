use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::file_config::{load_config, FileConfig};

const DEFAULT_HISTORY_PATH: &str = "history.json";
const DEFAULT_CONFIG_PATH: &str = "counterpoint.toml";

/// Application configuration, resolved once at startup and passed down.
///
/// A provider whose key is absent is simply not called; the corresponding
/// stage reports a configuration error instead.
#[derive(Debug, Clone)]
pub struct Config {
    // Providers
    pub tavily_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub xai_api_key: Option<String>,

    // Storage
    pub history_path: PathBuf,

    // Tuning from TOML (defaults when no file)
    pub file: FileConfig,
}

impl Config {
    /// Load `.env` (if any), the optional TOML file, and environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match std::env::var("COUNTERPOINT_CONFIG").ok() {
            Some(path) => load_config(PathBuf::from(path).as_path())?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    load_config(&default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let history_path = optional_env("COUNTERPOINT_HISTORY_PATH")
            .map(PathBuf::from)
            .or_else(|| file.history.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH));

        let config = Self {
            tavily_api_key: first_env(&["TAVILY_API_KEY", "Tavily API Key"]),
            gemini_api_key: first_env(&["GEMINI_API_KEY", "Gemini API Key"]),
            xai_api_key: optional_env("XAI_API_KEY"),
            history_path,
            file,
        };

        config.log_keys();
        Ok(config)
    }

    /// Config with no credentials, for tests and offline commands.
    pub fn offline(history_path: impl Into<PathBuf>) -> Self {
        Self {
            tavily_api_key: None,
            gemini_api_key: None,
            xai_api_key: None,
            history_path: history_path.into(),
            file: FileConfig::default(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.file.http.timeout_secs)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  TAVILY_API_KEY: {}", preview_opt(&self.tavily_api_key));
        tracing::info!("  GEMINI_API_KEY: {}", preview_opt(&self.gemini_api_key));
        tracing::info!("  XAI_API_KEY: {}", preview_opt(&self.xai_api_key));
        tracing::info!("  history: {}", self.history_path.display());
    }
}

/// Unset and empty are the same thing.
fn optional_env(key: &str) -> Option<String> {
    first_env(&[key])
}

/// Older `.env` files name some keys with spaces ("Tavily API Key"), so
/// those are accepted after the canonical name.
fn first_env(keys: &[&str]) -> Option<String> {
    first_present(keys, |k| std::env::var(k).ok())
}

fn first_present(keys: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    keys.iter()
        .filter_map(|k| lookup(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
