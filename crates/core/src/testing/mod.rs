//! Testing utilities and mock implementations.
//!
//! This module provides a scripted transport and fixtures, allowing the whole
//! lookup / redeem / notify flow to be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use giftrun_core::testing::{fixtures, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.push_reply(fixtures::PLAYER_URL, fixtures::player_found("1", 245)).await;
//! transport.push_reply(fixtures::GIFT_URL, fixtures::api_reply(0, "SUCCESS")).await;
//! ```

mod mock_transport;

pub use mock_transport::{MockTransport, RecordedRequest, ReplyResult};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::config::{Config, TimeUnit};
    use crate::transport::{HttpReply, TransportError};

    pub const PLAYER_URL: &str = "http://mock.local/api/player";
    pub const GIFT_URL: &str = "http://mock.local/api/gift_code";
    pub const WEBHOOK_URL: &str = "http://mock.local/webhook";

    /// Config pointing at the mock URLs, with pacing disabled.
    pub fn config(ids_csv: &str) -> Config {
        Config {
            secret: "s3cret".to_string(),
            current_code: "ABC".to_string(),
            ids_csv: ids_csv.to_string(),
            player_endpoint: PLAYER_URL.to_string(),
            gift_endpoint: GIFT_URL.to_string(),
            time_unit: TimeUnit::Seconds,
            include_kid: false,
            discord_webhook: None,
            pacing_ms: 0,
            ..Config::default()
        }
    }

    /// A `{"code":<code>,"msg":<msg>}` reply.
    pub fn api_reply(code: i64, msg: &str) -> Result<HttpReply, TransportError> {
        Ok(HttpReply::ok(
            json!({ "code": code, "msg": msg, "data": null }).to_string(),
        ))
    }

    /// A successful player lookup carrying `kid`.
    pub fn player_found(fid: &str, kid: i64) -> Result<HttpReply, TransportError> {
        Ok(HttpReply::ok(
            json!({
                "code": 0,
                "msg": "success",
                "data": {
                    "fid": fid,
                    "nickname": format!("player-{}", fid),
                    "kid": kid,
                    "stove_lv": 30,
                }
            })
            .to_string(),
        ))
    }

    /// A player lookup that finds nothing.
    pub fn player_not_found() -> Result<HttpReply, TransportError> {
        Ok(HttpReply::ok(
            json!({ "code": 1, "msg": "role not exist.", "data": [] }).to_string(),
        ))
    }
}
