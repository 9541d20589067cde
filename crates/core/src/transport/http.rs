//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use super::{HttpReply, HttpRequest, RequestBody, Transport, TransportError};

const BROWSER_ACCEPT: &str = "application/json, text/plain, */*";
const BROWSER_ORIGIN: &str = "https://wos-giftcode.centurygame.com";
const BROWSER_REFERER: &str = "https://wos-giftcode.centurygame.com/";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123 Safari/537.36";

/// Headers sent with every form request so the API sees a browser origin.
/// `Content-Type` is set by the form encoder.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ORIGIN, HeaderValue::from_static(BROWSER_ORIGIN));
    headers.insert(REFERER, HeaderValue::from_static(BROWSER_REFERER));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers
}

/// Transport over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let builder = self.client.post(&request.url).timeout(request.timeout);
        let builder = match &request.body {
            RequestBody::Form(fields) => builder.headers(browser_headers()).form(fields),
            RequestBody::Json(value) => builder.json(value),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(url = %request.url, status, bytes = bytes.len(), "HTTP response received");

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert_eq!(headers.get(ACCEPT).unwrap(), BROWSER_ACCEPT);
        assert_eq!(headers.get(ORIGIN).unwrap(), BROWSER_ORIGIN);
        assert_eq!(headers.get(REFERER).unwrap(), BROWSER_REFERER);
        assert!(headers
            .get(USER_AGENT)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("Mozilla/5.0"));
    }
}
