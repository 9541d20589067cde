//! Signed form client shared by player lookup and redemption.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::TimeUnit;
use crate::response::ApiResponse;
use crate::sign::{FieldSet, Signer};
use crate::transport::{HttpRequest, Transport, TransportError};

/// Why a signed call produced no usable response.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("unparseable response (HTTP {status}): {message}")]
    Parse { status: u16, message: String },
}

/// Signs field sets and posts them as forms.
#[derive(Clone)]
pub struct SignedClient {
    transport: Arc<dyn Transport>,
    signer: Signer,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl SignedClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        signer: Signer,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            signer,
            clock,
            timeout,
        }
    }

    /// Current time rendered for the `time` field.
    pub fn timestamp(&self, unit: TimeUnit) -> String {
        self.clock.timestamp(unit)
    }

    /// Sign `fields`, post them to `url` and parse the JSON envelope.
    ///
    /// `label` only tags log lines.
    pub async fn post_signed(
        &self,
        label: &str,
        url: &str,
        fields: &FieldSet,
    ) -> Result<ApiResponse, CallError> {
        let (sign, form) = self.signer.signed_form(fields);

        debug!(call = label, sign_base = %fields, "Sign base");
        debug!(call = label, sign = %sign, "Signature computed");
        debug!(call = label, payload = ?form, "Request payload");

        let reply = self
            .transport
            .send(HttpRequest::form(url, form, self.timeout))
            .await?;

        info!(call = label, status = reply.status, "HTTP {}", reply.status);
        info!(call = label, body = %reply.body, "Response body");

        ApiResponse::parse(&reply.body).map_err(|e| CallError::Parse {
            status: reply.status,
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for SignedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedClient")
            .field("signer", &self.signer)
            .field("timeout", &self.timeout)
            .finish()
    }
}
