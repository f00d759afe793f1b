use crate::config::types::{Config, FetchConfig, ServerConfig, UserAgentConfig};
use crate::ConfigError;
use std::net::SocketAddr;

/// Upper bound for either timeout, in seconds
const MAX_TIMEOUT_SECS: u64 = 300;

/// Upper bound for followed redirects
const MAX_REDIRECTS: usize = 20;

/// Upper bound for the accepted target body size
const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    let name = config.agent_name.trim();

    if name.is_empty() {
        return Err(ConfigError::Validation(
            "agent_name cannot be empty".to_string(),
        ));
    }

    // robots.txt groups are matched on the leading product token
    if !name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "agent_name must start with a product token (letters, '_' or '-'), got '{}'",
            config.agent_name
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(ConfigError::Validation(format!(
            "agent_name cannot contain control characters, got '{}'",
            config.agent_name.escape_debug()
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.connect_timeout_secs
        )));
    }

    if config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs ({}) cannot exceed timeout_secs ({})",
            config.connect_timeout_secs, config.timeout_secs
        )));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    if config.max_body_bytes == 0 || config.max_body_bytes > MAX_BODY_BYTES {
        return Err(ConfigError::Validation(format!(
            "max_body_bytes must be between 1 and {}, got {}",
            MAX_BODY_BYTES, config.max_body_bytes
        )));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config
        .bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidAddress(format!("'{}': {}", config.bind, e)))?;
    Ok(())
}
