use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Sift
///
/// Every section is optional; a missing file or section falls back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Identity presented to robots.txt and to the target site
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAgentConfig {
    /// Full agent string sent as the `User-Agent` header (e.g. "MyCoolScraper/1.0")
    #[serde(rename = "agent-name", default = "default_agent_name")]
    pub agent_name: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
        }
    }
}

/// What to do when robots.txt itself cannot be retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RobotsUnavailablePolicy {
    /// Report the robots.txt failure as the request's failure
    #[default]
    Fail,
    /// Treat the site as having no restrictions
    Allow,
}

/// Outbound request behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Total time allowed for each outbound request (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Largest target body accepted, in bytes
    #[serde(rename = "max-body-bytes", default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(rename = "on-robots-unavailable", default)]
    pub on_robots_unavailable: RobotsUnavailablePolicy,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
            max_body_bytes: default_max_body_bytes(),
            on_robots_unavailable: RobotsUnavailablePolicy::default(),
        }
    }
}

/// HTTP endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the endpoint listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_agent_name() -> String {
    "MyCoolScraper/1.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
