use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Bare environment variables read on top of the optional config file.
pub const ENV_KEYS: &[&str] = &[
    "SECRET",
    "CURRENT_CODE",
    "IDS_CSV",
    "PLAYER_ENDPOINT",
    "GIFT_ENDPOINT",
    "TIME_UNIT",
    "INCLUDE_KID",
    "DISCORD_WEBHOOK",
];

/// Numeric knobs read from `GIFTRUN_`-prefixed variables.
pub const PREFIXED_ENV_KEYS: &[&str] = &["PACING_MS", "API_TIMEOUT_SECS", "NOTIFY_TIMEOUT_SECS"];

/// Load configuration from defaults, an optional TOML file, and the environment.
///
/// Precedence (lowest first): serde defaults, `path`, the bare variables in
/// [`ENV_KEYS`], then the `GIFTRUN_`-prefixed [`PREFIXED_ENV_KEYS`].
///
/// Bare variables are merged as plain strings. `Env` would parse them as
/// numbers first, turning a secret of `1.50` into `1.5` or a fid of `0123`
/// into `123`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    for key in ENV_KEYS {
        if let Ok(value) = std::env::var(key) {
            figment = figment.merge((key.to_ascii_lowercase(), value));
        }
    }

    figment
        .merge(Env::prefixed("GIFTRUN_").only(PREFIXED_ENV_KEYS))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
