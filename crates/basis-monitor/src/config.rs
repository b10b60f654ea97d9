/*
[INPUT]:  YAML configuration file (optional) and CLI overrides
[OUTPUT]: Validated monitor configuration
[POS]:    Configuration layer - feed, display and HTTP settings
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use basis_feed_adapter::ClientConfig;
use basis_feed_adapter::http::client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use url::Url;

/// How the dashboard acquires data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Periodic `GET /api/basis`
    #[default]
    Poll,
    /// WebSocket `/ws` push channel
    Push,
}

impl FeedMode {
    pub fn label(self) -> &'static str {
        match self {
            FeedMode::Poll => "poll",
            FeedMode::Push => "push",
        }
    }
}

/// Top-level configuration for the basis monitor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Backend location, `http` or `https`
    pub base_url: String,
    pub mode: FeedMode,
    /// Rows kept in the visible table
    pub display_limit: usize,
    /// Lifetime of transient notifications
    pub toast_secs: u64,
    pub http: HttpConfig,
    pub poll: PollConfig,
    pub push: PushConfig,
}

/// HTTP client timeouts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// Polling schedule and retry budget
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub retry_delay_secs: u64,
    pub max_retries: u32,
}

/// Push channel reconnect policy
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PushConfig {
    /// Base delay; attempt `n` waits `n * reconnect_delay_secs`
    pub reconnect_delay_secs: u64,
    pub max_reconnect_attempts: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mode: FeedMode::default(),
            display_limit: 10,
            toast_secs: 3,
            http: HttpConfig::default(),
            poll: PollConfig::default(),
            push: PushConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            retry_delay_secs: 3,
            max_retries: 3,
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: 3,
            max_reconnect_attempts: 5,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // an empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url {:?}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("base_url must use http or https, got {}", url.scheme());
        }
        if self.display_limit == 0 {
            bail!("display_limit must be at least 1");
        }
        if self.toast_secs == 0 {
            bail!("toast_secs must be at least 1");
        }
        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            bail!("http timeouts must be at least 1 second");
        }
        if self.poll.interval_secs == 0 {
            bail!("poll.interval_secs must be at least 1");
        }
        if self.poll.retry_delay_secs == 0 {
            bail!("poll.retry_delay_secs must be at least 1");
        }
        if self.push.reconnect_delay_secs == 0 {
            bail!("push.reconnect_delay_secs must be at least 1");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl PushConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}
