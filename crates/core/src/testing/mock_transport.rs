//! Mock transport for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::transport::{HttpReply, HttpRequest, Transport, TransportError};

/// A recorded request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The request that was sent.
    pub request: HttpRequest,
    /// When it was sent.
    pub timestamp: Instant,
}

/// Scripted outcome of a single request.
pub type ReplyResult = Result<HttpReply, TransportError>;

/// A handler that produces replies dynamically from the request.
type RequestHandler = Box<dyn Fn(&HttpRequest) -> ReplyResult + Send + Sync>;

/// Mock implementation of the Transport trait.
///
/// Reply resolution order for each request:
/// 1. the queue of scripted replies registered for the request URL,
/// 2. the request handler, if set,
/// 3. the default reply (`{"code":1,"msg":"no scripted reply"}`).
///
/// # Example
///
/// ```rust,ignore
/// use giftrun_core::testing::{fixtures, MockTransport};
///
/// let transport = MockTransport::new();
/// transport.push_reply(fixtures::GIFT_URL, fixtures::api_reply(1, "params error")).await;
/// transport.push_reply(fixtures::GIFT_URL, fixtures::api_reply(0, "SUCCESS")).await;
///
/// // ... run the redeemer ...
///
/// assert_eq!(transport.requests_to(fixtures::GIFT_URL).await.len(), 2);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    /// Scripted replies per URL, consumed front to back.
    scripted: Arc<RwLock<HashMap<String, VecDeque<ReplyResult>>>>,
    /// Fallback handler.
    handler: Arc<RwLock<Option<RequestHandler>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("scripted", &"<scripted>")
            .field("handler", &"<handler>")
            .field("requests", &"<requests>")
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a new mock transport with no scripted replies.
    pub fn new() -> Self {
        Self {
            scripted: Arc::new(RwLock::new(HashMap::new())),
            handler: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a reply for the next unanswered request to `url`.
    pub async fn push_reply(&self, url: &str, reply: ReplyResult) {
        self.scripted
            .write()
            .await
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Set a handler answering requests that have no scripted reply.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&HttpRequest) -> ReplyResult + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Recorded requests sent to `url`, in order.
    pub async fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.request.url == url)
            .map(|r| r.request.clone())
            .collect()
    }

    /// Get the number of requests sent.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        self.requests.write().await.push(RecordedRequest {
            request: request.clone(),
            timestamp: Instant::now(),
        });

        let scripted = self
            .scripted
            .write()
            .await
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front);
        if let Some(reply) = scripted {
            return reply;
        }

        if let Some(ref handler) = *self.handler.read().await {
            return handler(&request);
        }

        Ok(HttpReply::ok(r#"{"code":1,"msg":"no scripted reply"}"#))
    }
}
