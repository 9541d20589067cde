//! Player lookup.
//!
//! Resolves account metadata, notably `kid`, before redemption. Every failure
//! collapses to "not found": the run continues without the metadata.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::SignedClient;
use crate::config::TimeUnit;
use crate::sign::FieldSet;

/// Account metadata from the player endpoint's `data` object.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    fields: Map<String, Value>,
}

impl PlayerInfo {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Secondary identifier, rendered as a plain string.
    pub fn kid(&self) -> Option<String> {
        match self.fields.get("kid")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn nickname(&self) -> Option<&str> {
        self.fields.get("nickname").and_then(Value::as_str)
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Looks up players on the player endpoint.
#[derive(Debug, Clone)]
pub struct PlayerLookup {
    client: SignedClient,
    endpoint: String,
    time_unit: TimeUnit,
}

impl PlayerLookup {
    pub fn new(client: SignedClient, endpoint: impl Into<String>, time_unit: TimeUnit) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            time_unit,
        }
    }

    /// Fetch metadata for `fid`; `None` on any failure.
    pub async fn fetch(&self, fid: &str) -> Option<PlayerInfo> {
        let fields = FieldSet::new()
            .with("fid", fid)
            .with("time", self.client.timestamp(self.time_unit));

        let response = match self.client.post_signed("player", &self.endpoint, &fields).await {
            Ok(response) => response,
            Err(e) => {
                warn!(fid, error = %e, "Player lookup failed");
                return None;
            }
        };

        if !response.is_success_code() {
            debug!(fid, msg = %response.message_lower(), "Player not found");
            return None;
        }

        let info = response.data_object().cloned().map(PlayerInfo::new);
        if let Some(ref info) = info {
            let kid = info.kid();
            debug!(
                fid,
                kid = kid.as_deref().unwrap_or("-"),
                nickname = info.nickname().unwrap_or("-"),
                "Player resolved"
            );
        }
        info
    }
}
