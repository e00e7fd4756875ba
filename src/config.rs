use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "saavn";
const ENV_PREFIX: &str = "SAAVN";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_scrape_interval")]
    pub scrape_interval_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Public root URL pinged to keep the host awake. Disabled when unset.
    #[serde(default)]
    pub keepalive_url: Option<String>,
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_secs: u64,
}

fn default_base_url() -> String {
    "https://www.jiosaavn.com".to_string()
}

fn default_db_path() -> String {
    "data/saavn.sqlite".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_scrape_interval() -> u64 {
    6 * 60 * 60
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_keepalive_interval() -> u64 {
    14 * 60
}

impl Settings {
    /// Load `saavn.toml` (optional) overlaid with `SAAVN_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        if settings.scrape_interval_secs == 0 || settings.keepalive_interval_secs == 0 {
            bail!("Scrape and keep-alive intervals must be non-zero");
        }
        Ok(settings)
    }

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.scrape_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sources_fall_back_to_defaults() {
        let settings: Settings = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.base_url, "https://www.jiosaavn.com");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.scrape_interval(), Duration::from_secs(21600));
        assert_eq!(settings.keepalive_interval(), Duration::from_secs(840));
        assert!(settings.keepalive_url.is_none());
    }

    #[test]
    fn overrides_replace_defaults() {
        let settings: Settings = config::Config::builder()
            .set_override("port", 9100)
            .unwrap()
            .set_override("keepalive_url", "https://example.test/")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.bind_addr(), "0.0.0.0:9100");
        assert_eq!(settings.keepalive_url.as_deref(), Some("https://example.test/"));
    }
}
