use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct NeoDBAPIAuthConfig {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NeoDBAPIConfig {
    pub url: String,
    /// Candidate shelf endpoint templates, tried in order until one answers
    /// with a success status. Placeholders: `{shelf}`, `{category}`, `{page}`.
    pub endpoints: Vec<String>,
    pub auth: NeoDBAPIAuthConfig,
    /// Item detail requests issued per batch before sleeping.
    pub rate_limit: usize,
    /// Pause between shelf listing pages, in milliseconds.
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    pub shelves: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub neodb_api: NeoDBAPIConfig,
    pub aggregator: AggregatorConfig,
    pub sink: SinkConfig,
}

impl Config {
    pub fn from_file(filename: &str) -> Config {
        let config = fs::read_to_string(filename).unwrap();
        let config: Config = toml::from_str(&config).unwrap();
        config
    }
}

impl Default for Config {
    fn default() -> Config {
        Self::from_file("config/config.toml")
    }
}
