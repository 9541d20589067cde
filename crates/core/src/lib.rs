pub mod client;
pub mod clock;
pub mod config;
pub mod notify;
pub mod player;
pub mod redeem;
pub mod response;
pub mod runner;
pub mod sign;
pub mod testing;
pub mod transport;

pub use client::{CallError, SignedClient};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    TimeUnit,
};
pub use notify::WebhookNotifier;
pub use player::{PlayerInfo, PlayerLookup};
pub use redeem::{plan_variants, AttemptOutcome, RedeemResult, Redeemer, Variant, EXHAUSTED_REASON};
pub use response::ApiResponse;
pub use runner::{RowResult, RunSummary, Runner};
pub use sign::{FieldSet, Signer};
pub use transport::{HttpReply, HttpRequest, HttpTransport, RequestBody, Transport, TransportError};
