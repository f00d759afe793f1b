//! URL handling module for Sumi-Sift
//!
//! This module validates target URLs and derives the robots.txt location
//! from a target's origin.

use crate::{UrlError, UrlResult};
use url::{Origin, Url};

/// Well-known path of the robots exclusion document
pub const ROBOTS_PATH: &str = "/robots.txt";

/// Parses and validates a target URL
///
/// The URL must be absolute, use the `http` or `https` scheme, and carry a
/// host. Surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use sumi_sift::url::parse_target_url;
///
/// let url = parse_target_url("https://shop.example.com/items?page=2").unwrap();
/// assert_eq!(url.host_str(), Some("shop.example.com"));
///
/// assert!(parse_target_url("/relative/path").is_err());
/// assert!(parse_target_url("ftp://example.com/file").is_err());
/// ```
pub fn parse_target_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Derives the robots.txt URL for a target
///
/// Takes the origin (scheme, host, and port) of `target` and appends
/// [`ROBOTS_PATH`]. Path, query, fragment, and credentials of the target
/// are discarded.
///
/// # Examples
///
/// ```
/// use sumi_sift::url::{parse_target_url, robots_url};
///
/// let target = parse_target_url("http://user:pw@example.com:8080/a/b?q=1#frag").unwrap();
/// let robots = robots_url(&target).unwrap();
/// assert_eq!(robots.as_str(), "http://example.com:8080/robots.txt");
/// ```
pub fn robots_url(target: &Url) -> UrlResult<Url> {
    match target.origin() {
        origin @ Origin::Tuple(..) => {
            let base = origin.ascii_serialization();
            Url::parse(&format!("{}{}", base, ROBOTS_PATH))
                .map_err(|e| UrlError::Parse(e.to_string()))
        }
        Origin::Opaque(_) => Err(UrlError::MissingHost),
    }
}
