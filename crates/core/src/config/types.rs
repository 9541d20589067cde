use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Shared secret appended to every signature base string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub secret: String,
    /// Gift code redeemed for every account in the run.
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_code: String,
    /// Comma-separated account identifiers.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ids_csv: String,
    #[serde(default = "default_player_endpoint", deserialize_with = "lenient_string")]
    pub player_endpoint: String,
    #[serde(default = "default_gift_endpoint", deserialize_with = "lenient_string")]
    pub gift_endpoint: String,
    #[serde(default)]
    pub time_unit: TimeUnit,
    /// Whether redemption variants carrying `kid` are generated.
    #[serde(default, deserialize_with = "bool_like")]
    pub include_kid: bool,
    /// Optional webhook receiving the final summary.
    #[serde(default, deserialize_with = "optional_string")]
    pub discord_webhook: Option<String>,
    /// Delay between accounts in milliseconds (default: 200).
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Timeout for lookup and redemption calls in seconds (default: 20).
    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,
    /// Timeout for the webhook call in seconds (default: 10).
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret: String::new(),
            current_code: String::new(),
            ids_csv: String::new(),
            player_endpoint: default_player_endpoint(),
            gift_endpoint: default_gift_endpoint(),
            time_unit: TimeUnit::default(),
            include_kid: false,
            discord_webhook: None,
            pacing_ms: default_pacing_ms(),
            api_timeout_secs: default_api_timeout(),
            notify_timeout_secs: default_notify_timeout(),
        }
    }
}

impl Config {
    /// Account identifiers in configured order, trimmed, empties dropped.
    pub fn fids(&self) -> Vec<String> {
        self.ids_csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }
}

fn default_player_endpoint() -> String {
    "https://wos-giftcode-api.centurygame.com/api/player".to_string()
}

fn default_gift_endpoint() -> String {
    "https://wos-giftcode-api.centurygame.com/api/gift_code".to_string()
}

fn default_pacing_ms() -> u64 {
    200
}

fn default_api_timeout() -> u64 {
    20
}

fn default_notify_timeout() -> u64 {
    10
}

/// Unit used to render the `time` request field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TimeUnit {
    #[default]
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Milliseconds,
}

impl TimeUnit {
    /// The unit not selected by `self`.
    pub fn other(self) -> Self {
        match self {
            TimeUnit::Seconds => TimeUnit::Milliseconds,
            TimeUnit::Milliseconds => TimeUnit::Seconds,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "seconds" => Ok(TimeUnit::Seconds),
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            other => Err(format!("unknown time unit '{}', expected s or ms", other)),
        }
    }
}

impl<'de> Deserialize<'de> for TimeUnit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar shapes the environment provider may hand us for a string field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s.trim().to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::UInt(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(Scalar::into_string).filter(|s| !s.is_empty()))
}

fn bool_like<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Bool(b) => Ok(b),
        Scalar::Int(n) => Ok(n != 0),
        Scalar::UInt(n) => Ok(n != 0),
        Scalar::Float(n) => Ok(n != 0.0),
        Scalar::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean-like value, got '{}'",
                other
            ))),
        },
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub secret_configured: bool,
    pub current_code: String,
    pub id_count: usize,
    pub player_endpoint: String,
    pub gift_endpoint: String,
    pub time_unit: TimeUnit,
    pub include_kid: bool,
    pub webhook_configured: bool,
    pub pacing_ms: u64,
    pub api_timeout_secs: u64,
    pub notify_timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            secret_configured: !config.secret.is_empty(),
            current_code: config.current_code.clone(),
            id_count: config.fids().len(),
            player_endpoint: config.player_endpoint.clone(),
            gift_endpoint: config.gift_endpoint.clone(),
            time_unit: config.time_unit,
            include_kid: config.include_kid,
            webhook_configured: config.discord_webhook.is_some(),
            pacing_ms: config.pacing_ms,
            api_timeout_secs: config.api_timeout_secs,
            notify_timeout_secs: config.notify_timeout_secs,
        }
    }
}
