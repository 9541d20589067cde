//! Webhook notification of the run summary.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use crate::transport::{HttpRequest, Transport};

/// Longest message, in characters, the webhook accepts.
pub const MAX_CONTENT_CHARS: usize = 1900;

/// Posts `{"content": ...}` to a chat webhook. Failures are logged, never raised.
#[derive(Clone)]
pub struct WebhookNotifier {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            url: url.into(),
            timeout,
        }
    }

    pub async fn notify(&self, summary: &str) {
        let content = truncate_chars(summary, MAX_CONTENT_CHARS);
        let request = HttpRequest::json(&self.url, json!({ "content": content }), self.timeout);

        match self.transport.send(request).await {
            Ok(reply) if (200..300).contains(&reply.status) => {
                info!(status = reply.status, "Summary posted to webhook");
            }
            Ok(reply) => {
                warn!(status = reply.status, body = %reply.body, "Webhook error");
            }
            Err(e) => {
                warn!(error = %e, "Webhook error");
            }
        }
    }
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// First `max` characters of `s`.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockTransport};
    use crate::transport::{HttpReply, RequestBody, TransportError};

    fn notifier(transport: &MockTransport) -> WebhookNotifier {
        WebhookNotifier::new(
            Arc::new(transport.clone()),
            fixtures::WEBHOOK_URL,
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[tokio::test]
    async fn test_notify_posts_truncated_json() {
        let transport = MockTransport::new();
        let summary = "x".repeat(MAX_CONTENT_CHARS + 100);
        notifier(&transport).notify(&summary).await;

        let requests = transport.requests_to(fixtures::WEBHOOK_URL).await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timeout, Duration::from_secs(10));
        match &requests[0].body {
            RequestBody::Json(body) => {
                let content = body["content"].as_str().unwrap();
                assert_eq!(content.chars().count(), MAX_CONTENT_CHARS);
            }
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notify_swallows_failures() {
        let transport = MockTransport::new();
        transport
            .push_reply(fixtures::WEBHOOK_URL, Err(TransportError::Timeout))
            .await;
        transport
            .push_reply(fixtures::WEBHOOK_URL, Ok(HttpReply::new(500, "boom")))
            .await;

        let notifier = notifier(&transport);
        notifier.notify("summary").await;
        notifier.notify("summary").await;
        assert_eq!(transport.request_count().await, 2);
    }
}
