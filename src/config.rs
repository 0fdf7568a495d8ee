use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
pub const DEFAULT_WEB_BASE: &str = "https://news.ycombinator.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Max stories resolved per load; 0 resolves everything the API lists.
    pub limit: usize,
    /// Parallel item fetches.
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            concurrency: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub web_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            web_url: DEFAULT_WEB_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("hnbest").join("config.toml"))
}

impl Config {
    /// Load the user config, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        toml::from_str::<Config>(&content).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[general]
limit = 100
concurrency = 4

[api]
base_url = "http://localhost:8080/v0"
web_url = "http://localhost:8080"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.limit, 100);
        assert_eq!(config.general.concurrency, 4);
        assert_eq!(config.api.base_url, "http://localhost:8080/v0");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str("[general]\nlimit = 10\n").unwrap();
        assert_eq!(config.general.limit, 10);
        assert_eq!(config.general.concurrency, 8);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(config.api.web_url, DEFAULT_WEB_BASE);
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.general.limit, 50);
        assert_eq!(config.api.web_url, DEFAULT_WEB_BASE);
    }
}
