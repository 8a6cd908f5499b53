use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - No OMDb API key is blank
/// - Timeouts are not 0
/// - Checkpoint interval is not 0
///
/// An empty key pool is allowed here so the feed command can run without
/// OMDb keys; the enrich command rejects it when building its pool.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if let Some(pos) = config.omdb.api_keys.iter().position(|k| k.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "omdb.api_keys[{}] is blank",
            pos
        )));
    }

    if config.omdb.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "omdb.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.feed.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "feed.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.enrich.checkpoint_every == 0 {
        return Err(ConfigError::ValidationError(
            "enrich.checkpoint_every cannot be 0".to_string(),
        ));
    }

    Ok(())
}
