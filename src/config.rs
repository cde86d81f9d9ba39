// src/config.rs
// Explicit configuration object, constructed once and passed into the
// orchestrator and the store. No process-wide mutable state.
//
// Resolution order: $TRACKER_CONFIG_PATH, then config/tracker.toml, then
// built-in defaults. Credentials stay out of the file: DATABASE_URL from the
// environment wins over anything configured here.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const ENV_CONFIG_PATH: &str = "TRACKER_CONFIG_PATH";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
const DEFAULT_CONFIG_PATH: &str = "config/tracker.toml";

/// One channel to ingest, in run order. `limit` overrides the global fetch
/// limit for this channel only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ChannelSpecDe")]
pub struct ChannelSpec {
    pub name: String,
    pub limit: Option<u32>,
}

impl ChannelSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            limit: None,
        }
    }
}

/// Accept both `"technology"` and `{ name = "technology", limit = 25 }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChannelSpecDe {
    Name(String),
    Full { name: String, limit: Option<u32> },
}

impl From<ChannelSpecDe> for ChannelSpec {
    fn from(de: ChannelSpecDe) -> Self {
        match de {
            ChannelSpecDe::Name(name) => ChannelSpec { name, limit: None },
            ChannelSpecDe::Full { name, limit } => ChannelSpec { name, limit },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    /// Non-default identifier; the provider rejects stock library agents.
    pub user_agent: String,
    /// Items per channel unless the channel overrides it.
    pub limit: u32,
    /// Per-request network timeout. The only timeout in a run.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            user_agent: "reddit-sentiment-tracker/0.1 (ingestion pipeline)".to_string(),
            limit: 50,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub fetch: FetchConfig,
    /// Ordered; the orchestrator processes channels exactly in this order.
    pub channels: Vec<ChannelSpec>,
    /// TTL for the read-side cache, seconds.
    pub cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/reddit_sentiment.db".to_string(),
            fetch: FetchConfig::default(),
            channels: [
                "technology",
                "worldnews",
                "science",
                "AskReddit",
                "todayilearned",
            ]
            .into_iter()
            .map(ChannelSpec::named)
            .collect(),
            cache_ttl_secs: 1_800,
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $TRACKER_CONFIG_PATH
    /// 2) config/tracker.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = Path::new(&p).to_path_buf();
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", p);
            }
            return Self::load_from(&pb);
        }
        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(fallback);
        }
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_DATABASE_URL) {
            if !url.trim().is_empty() {
                self.database_url = url;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            bail!("config: at least one channel is required");
        }
        if self.channels.iter().any(|c| c.name.trim().is_empty()) {
            bail!("config: channel names must be non-empty");
        }
        if self.fetch.limit == 0 || self.fetch.limit > 100 {
            bail!("config: fetch.limit must be in 1..=100");
        }
        if self.fetch.user_agent.trim().is_empty() {
            bail!("config: fetch.user_agent must be non-empty");
        }
        Ok(())
    }

    /// Effective fetch limit for one channel.
    pub fn limit_for(&self, channel: &ChannelSpec) -> u32 {
        channel.limit.unwrap_or(self.fetch.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn defaults_cover_the_standard_channels() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.channels.len(), 5);
        assert_eq!(cfg.channels[0].name, "technology");
        assert_eq!(cfg.fetch.limit, 50);
        assert_eq!(cfg.fetch.timeout_secs, 15);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn channels_accept_string_or_table_form() {
        let toml = r#"
            database_url = "sqlite::memory:"
            channels = ["technology", { name = "science", limit = 25 }]
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.channels[0], ChannelSpec::named("technology"));
        assert_eq!(cfg.channels[1].name, "science");
        assert_eq!(cfg.limit_for(&cfg.channels[0]), 50);
        assert_eq!(cfg.limit_for(&cfg.channels[1]), 25);
    }

    #[test]
    fn out_of_range_limit_is_rejected() {
        let toml = r#"
            channels = ["technology"]
            [fetch]
            limit = 500
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_database_url_wins() {
        env::set_var(ENV_DATABASE_URL, "sqlite://elsewhere.db");
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides();
        assert_eq!(cfg.database_url, "sqlite://elsewhere.db");
        env::remove_var(ENV_DATABASE_URL);
    }

    #[serial_test::serial]
    #[test]
    fn load_default_reads_env_path_first() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tracker.toml");
        std::fs::write(
            &path,
            r#"
                database_url = "sqlite::memory:"
                channels = ["rust"]
            "#,
        )
        .unwrap();

        env::remove_var(ENV_DATABASE_URL);
        env::set_var(ENV_CONFIG_PATH, path.display().to_string());
        let cfg = AppConfig::load_default().unwrap();
        assert_eq!(cfg.channels, vec![ChannelSpec::named("rust")]);
        env::remove_var(ENV_CONFIG_PATH);
    }
}
