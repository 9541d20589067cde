use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - secret, current_code and ids_csv are present
/// - ids_csv yields at least one identifier
/// - both API endpoints are set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut missing = Vec::new();
    if config.secret.is_empty() {
        missing.push("SECRET");
    }
    if config.current_code.is_empty() {
        missing.push("CURRENT_CODE");
    }
    if config.fids().is_empty() {
        missing.push("IDS_CSV");
    }
    if !missing.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} must be set",
            missing.join(", ")
        )));
    }

    if config.player_endpoint.is_empty() || config.gift_endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "player_endpoint and gift_endpoint cannot be empty".to_string(),
        ));
    }

    Ok(())
}
