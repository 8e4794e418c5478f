//! Crawler configuration.
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, an optional YAML file (`--config`), and CLI flags.
//!
//! ```yaml
//! base_url: https://www.ptt.cc
//! timeout_secs: 3
//! politeness_delay_ms: 500
//! jitter_ms: 100
//! concurrency: 1
//! user_agent: ptt_crawler/0.1
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// Runtime settings for fetching and crawling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Site root that `/bbs/...` paths are joined onto.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Minimum interval between two request starts.
    pub politeness_delay_ms: u64,
    /// Upper bound of the random extra delay added to each interval.
    pub jitter_ms: u64,
    /// Number of article requests allowed in flight at once.
    pub concurrency: usize,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ptt.cc".to_string(),
            timeout_secs: 3,
            politeness_delay_ms: 500,
            jitter_ms: 100,
            concurrency: 1,
            user_agent: concat!("ptt_crawler/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load the config file at `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let yaml = fs::read_to_string(path).await?;
                let config = Self::from_yaml(&yaml)?;
                info!(path, "Loaded configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply CLI overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        delay_ms: Option<u64>,
        concurrency: Option<usize>,
        timeout_secs: Option<u64>,
    ) -> Self {
        if let Some(delay_ms) = delay_ms {
            self.politeness_delay_ms = delay_ms;
        }
        if let Some(concurrency) = concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }

    /// Stream width for article fetches; never below one.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
