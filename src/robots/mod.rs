//! Robots.txt handling module
//!
//! This module provides functionality for fetching and evaluating robots.txt files.
//! Nothing is cached: every extraction request fetches the policy fresh.

mod parser;

pub use parser::{product_token, ParsedRobots};

use crate::config::RobotsUnavailablePolicy;
use crate::url::robots_url;
use crate::SiftError;
use reqwest::Client;
use url::Url;

/// Outcome of evaluating a site's robots.txt for one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
}

/// Fetches robots.txt for the origin of `target`
///
/// # Arguments
///
/// * `client` - The HTTP client to use (carries the agent string and timeouts)
/// * `target` - The page that is about to be fetched
/// * `on_unavailable` - What to do when robots.txt cannot be retrieved
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Fetched robots.txt, or allow-all when unavailable
///   and `on_unavailable` is [`RobotsUnavailablePolicy::Allow`]
/// * `Err(SiftError::RobotsUnavailable)` - Transport failure or non-2xx status
pub async fn fetch_robots(
    client: &Client,
    target: &Url,
    on_unavailable: RobotsUnavailablePolicy,
) -> Result<ParsedRobots, SiftError> {
    let robots_url = robots_url(target)?;
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    match download_robots(client, &robots_url).await {
        Ok(content) => Ok(ParsedRobots::from_content(&content)),
        Err(e) => match on_unavailable {
            RobotsUnavailablePolicy::Fail => Err(SiftError::RobotsUnavailable {
                source: Box::new(e),
            }),
            RobotsUnavailablePolicy::Allow => {
                tracing::warn!("{}; proceeding as allow-all", e);
                Ok(ParsedRobots::allow_all())
            }
        },
    }
}

async fn download_robots(client: &Client, robots_url: &Url) -> Result<String, SiftError> {
    let url_str = robots_url.as_str();

    let response = client
        .get(robots_url.clone())
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

    response
        .text()
        .await
        .map_err(|e| SiftError::from_request(url_str, e))
}

/// Checks if a URL is allowed by robots.txt
pub fn evaluate(robots: &ParsedRobots, url: &Url, user_agent: &str) -> PolicyDecision {
    PolicyDecision {
        allowed: robots.is_allowed(url.as_str(), user_agent),
    }
}
