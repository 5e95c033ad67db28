use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// TOML-backed tuning loaded from disk.
/// Secrets (API keys) stay as env vars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    #[serde(default = "default_synthesis_model")]
    pub synthesis: String,
    #[serde(default = "default_social_model")]
    pub social: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            synthesis: default_synthesis_model(),
            social: default_social_model(),
        }
    }
}

fn default_synthesis_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_social_model() -> String {
    "grok-3".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Upper bound requested from the provider on both search tiers.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Below this many recent results the unscoped search replaces them.
    #[serde(default = "default_min_recent_results")]
    pub min_recent_results: usize,
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_recent_results: default_min_recent_results(),
            search_depth: default_search_depth(),
        }
    }
}

fn default_max_results() -> u32 {
    10
}

fn default_min_recent_results() -> usize {
    3
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    pub path: Option<PathBuf>,
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.models.synthesis, "gemini-flash-latest");
        assert_eq!(config.models.social, "grok-3");
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.search.min_recent_results, 3);
        assert_eq!(config.http.timeout_secs, 60);
        assert!(config.history.path.is_none());
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [models]
            social = "grok-4"

            [history]
            path = "/var/lib/counterpoint/history.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.models.social, "grok-4");
        assert_eq!(config.models.synthesis, "gemini-flash-latest");
        assert_eq!(
            config.history.path.as_deref(),
            Some(Path::new("/var/lib/counterpoint/history.json"))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("[search]\nmax = 3").is_err());
    }

    #[test]
    fn load_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
