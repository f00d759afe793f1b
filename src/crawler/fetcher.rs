//! Policy-gated HTTP fetcher
//!
//! This module handles all outbound HTTP requests, including:
//! - Building the HTTP client with the configured agent string and timeouts
//! - Fetching and evaluating robots.txt for the target's origin
//! - Fetching the target page only when robots.txt allows it
//! - Classifying failures into readable messages
//!
//! There are no retries: a single failure is terminal for the request.

use crate::config::{Config, RobotsUnavailablePolicy};
use crate::robots::{evaluate, fetch_robots, PolicyDecision};
use crate::SiftError;
use reqwest::{header, redirect::Policy, Client};
use url::Url;

/// Reason carried by [`FetchOutcome::Disallowed`]
pub const DISALLOWED_REASON: &str = "policy-disallowed";

/// Result of a policy-gated fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// robots.txt forbids the target; the target was never requested
    Disallowed {
        /// Always [`DISALLOWED_REASON`]
        reason: String,
    },

    /// The target page body
    Fetched { body: String },

    /// robots.txt or the target could not be fetched
    Failed {
        /// Error description
        reason: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// The configured agent name is sent as the `User-Agent` header on every
/// request, including the robots.txt fetch.
///
/// # Example
///
/// ```no_run
/// use sumi_sift::config::Config;
/// use sumi_sift::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.agent_name.trim())
        .timeout(config.fetch.timeout())
        .connect_timeout(config.fetch.connect_timeout())
        .redirect(Policy::limited(config.fetch.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages on behalf of one agent, honoring robots.txt
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    agent_name: String,
    on_robots_unavailable: RobotsUnavailablePolicy,
    max_body_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &Config) -> Result<Self, SiftError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(
            client,
            config.user_agent.agent_name.trim(),
            config.fetch.on_robots_unavailable,
            config.fetch.max_body_bytes,
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(
        client: Client,
        agent_name: &str,
        on_robots_unavailable: RobotsUnavailablePolicy,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            client,
            agent_name: agent_name.to_string(),
            on_robots_unavailable,
            max_body_bytes,
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Fetches robots.txt for the target's origin and evaluates it
    pub async fn check_policy(&self, target: &Url) -> Result<PolicyDecision, SiftError> {
        let robots = fetch_robots(&self.client, target, self.on_robots_unavailable).await?;
        Ok(evaluate(&robots, target, &self.agent_name))
    }

    /// Fetches the target page body without consulting robots.txt
    ///
    /// Callers are expected to have called [`Fetcher::check_policy`] first.
    ///
    /// # Failure cases
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Timeout | `SiftError::Timeout` |
    /// | Connection refused / DNS | `SiftError::Connect` |
    /// | Redirect chain too long | `SiftError::RedirectLimit` |
    /// | Non-2xx status | `SiftError::HttpStatus` |
    /// | Non-textual Content-Type | `SiftError::ContentMismatch` |
    /// | Body over `max-body-bytes` | `SiftError::BodyTooLarge` |
    /// | Empty or whitespace body | `SiftError::EmptyBody` |
    pub async fn fetch_page(&self, target: &Url) -> Result<String, SiftError> {
        let url_str = target.as_str();

        let mut response = self
            .client
            .get(target.clone())
            .header(header::USER_AGENT, &self.agent_name)
            .send()
            .await
            .map_err(|e| SiftError::from_request(url_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiftError::HttpStatus {
                url: url_str.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(content_type) = content_type {
            if !is_textual(&content_type) {
                return Err(SiftError::ContentMismatch {
                    url: url_str.to_string(),
                    content_type,
                });
            }
        }

        let too_large = || SiftError::BodyTooLarge {
            url: url_str.to_string(),
            limit: self.max_body_bytes,
        };

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong, so the limit is enforced while reading too
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SiftError::from_request(url_str, e))?
        {
            if bytes.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if body.trim().is_empty() {
            return Err(SiftError::EmptyBody {
                url: url_str.to_string(),
            });
        }

        Ok(body)
    }

    /// Checks robots.txt, then fetches the target if allowed
    ///
    /// # Request Flow
    ///
    /// 1. GET `<origin>/robots.txt`
    /// 2. Evaluate it for this agent; stop with `Disallowed` if forbidden
    /// 3. GET the target
    pub async fn fetch(&self, target: &Url) -> FetchOutcome {
        match self.check_policy(target).await {
            Ok(PolicyDecision { allowed: true }) => {}
            Ok(PolicyDecision { allowed: false }) => {
                return FetchOutcome::Disallowed {
                    reason: DISALLOWED_REASON.to_string(),
                }
            }
            Err(e) => {
                return FetchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }

        match self.fetch_page(target).await {
            Ok(body) => FetchOutcome::Fetched { body },
            Err(e) => FetchOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Returns true for Content-Types the HTML parser can make sense of
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.is_empty()
        || mime.starts_with("text/")
        || mime.contains("html")
        || mime.contains("xml")
        || mime.contains("json")
}
