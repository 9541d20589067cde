//! Gift code redemption with field-shape fallbacks.
//!
//! The endpoint's exact field requirements (timestamp unit, whether `kid` is
//! part of the signed set) are not stable, so a fixed, ordered list of
//! variants is tried until one is accepted:
//!
//! 1. `{fid, cdk, time}` in the configured unit
//! 2. variant 1 plus `kid`
//! 3. `{fid, cdk, time}` in the other unit
//! 4. variant 3 plus `kid`
//!
//! Variants 2 and 4 exist only when `kid` is known and inclusion is enabled.

use std::fmt;

use tracing::{debug, info, warn};

use crate::client::{CallError, SignedClient};
use crate::config::TimeUnit;
use crate::response::ApiResponse;
use crate::sign::FieldSet;
use crate::transport::TransportError;

/// Failure reason recorded when every variant was turned down.
pub const EXHAUSTED_REASON: &str =
    "all variants rejected; likely endpoint/signature mismatch or network-level blocking";

const SUCCESS_MARKERS: &[&str] = &["success", "received", "same type"];
const SHAPE_REJECTION_MARKERS: &[&str] = &["sign error", "params error"];

/// One field-set shape for the redemption request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub time_unit: TimeUnit,
    pub kid: Option<String>,
}

impl Variant {
    /// Field set for this shape, stamped with `time`.
    pub fn fields(&self, fid: &str, cdk: &str, time: String) -> FieldSet {
        let fields = FieldSet::new()
            .with("fid", fid)
            .with("cdk", cdk)
            .with("time", time);
        match &self.kid {
            Some(kid) => fields.with("kid", kid.as_str()),
            None => fields,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kid = if self.kid.is_some() { "Y" } else { "N" };
        write!(f, "kid:{}|time:{}", kid, self.time_unit)
    }
}

/// The ordered variant list for one account.
pub fn plan_variants(configured: TimeUnit, kid: Option<&str>, include_kid: bool) -> Vec<Variant> {
    let kid = kid.filter(|k| include_kid && !k.is_empty());

    let mut variants = Vec::with_capacity(4);
    for unit in [configured, configured.other()] {
        variants.push(Variant {
            time_unit: unit,
            kid: None,
        });
        if let Some(kid) = kid {
            variants.push(Variant {
                time_unit: unit,
                kid: Some(kid.to_string()),
            });
        }
    }
    variants
}

/// Classification of a single redemption attempt.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    /// Accepted, or already redeemed; terminal.
    Success(ApiResponse),
    /// The server rejected the field shape or signature.
    SignOrParamsRejected(String),
    /// Any other refusal from the server.
    Rejected(String),
    TransportError(TransportError),
    ParseError(String),
}

impl AttemptOutcome {
    /// Apply the decision rule to a parsed response.
    pub fn from_response(response: ApiResponse) -> Self {
        let msg = response.message_lower();
        if response.is_success_code() || SUCCESS_MARKERS.iter().any(|m| msg.contains(m)) {
            AttemptOutcome::Success(response)
        } else if SHAPE_REJECTION_MARKERS.iter().any(|m| msg.contains(m)) {
            AttemptOutcome::SignOrParamsRejected(msg)
        } else {
            AttemptOutcome::Rejected(msg)
        }
    }

    pub fn from_call(result: Result<ApiResponse, CallError>) -> Self {
        match result {
            Ok(response) => Self::from_response(response),
            Err(CallError::Transport(e)) => AttemptOutcome::TransportError(e),
            Err(e @ CallError::Parse { .. }) => AttemptOutcome::ParseError(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

/// Final per-account result.
#[derive(Debug, Clone)]
pub enum RedeemResult {
    Ok(ApiResponse),
    Fail { reason: String },
}

impl RedeemResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, RedeemResult::Ok(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            RedeemResult::Ok(_) => "OK",
            RedeemResult::Fail { .. } => "FAIL",
        }
    }
}

/// Posts redemption attempts to the gift code endpoint.
#[derive(Debug, Clone)]
pub struct Redeemer {
    client: SignedClient,
    endpoint: String,
    time_unit: TimeUnit,
    include_kid: bool,
}

impl Redeemer {
    pub fn new(
        client: SignedClient,
        endpoint: impl Into<String>,
        time_unit: TimeUnit,
        include_kid: bool,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            time_unit,
            include_kid,
        }
    }

    /// Try each variant in order until one succeeds.
    ///
    /// Every non-success outcome, including transport and parse failures,
    /// moves on to the next variant.
    pub async fn redeem(&self, fid: &str, cdk: &str, kid: Option<&str>) -> RedeemResult {
        let variants = plan_variants(self.time_unit, kid, self.include_kid);

        for variant in &variants {
            let outcome = self.attempt(fid, cdk, variant).await;
            match outcome {
                AttemptOutcome::Success(response) => {
                    info!(fid, variant = %variant, "Redemption accepted");
                    return RedeemResult::Ok(response);
                }
                AttemptOutcome::SignOrParamsRejected(msg) => {
                    debug!(fid, variant = %variant, msg = %msg, "Variant shape rejected");
                }
                AttemptOutcome::Rejected(msg) => {
                    debug!(fid, variant = %variant, msg = %msg, "Variant refused");
                }
                AttemptOutcome::TransportError(e) => {
                    warn!(fid, variant = %variant, error = %e, "Variant request failed");
                }
                AttemptOutcome::ParseError(e) => {
                    warn!(fid, variant = %variant, error = %e, "Variant response unreadable");
                }
            }
        }

        warn!(fid, attempts = variants.len(), "All redemption variants rejected");
        RedeemResult::Fail {
            reason: EXHAUSTED_REASON.to_string(),
        }
    }

    async fn attempt(&self, fid: &str, cdk: &str, variant: &Variant) -> AttemptOutcome {
        let fields = variant.fields(fid, cdk, self.client.timestamp(variant.time_unit));
        let label = format!("gift_code[{}]", variant);
        AttemptOutcome::from_call(self.client.post_signed(&label, &self.endpoint, &fields).await)
    }
}
