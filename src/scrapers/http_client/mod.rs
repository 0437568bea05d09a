//! HTTP client shared by every source adapter.

mod charset;
mod payload;
mod response;
mod user_agent;

pub use charset::{decode_html, detect_encoding};
pub use payload::{Download, JsonpTrim, Payload, PayloadFormat};
pub use response::{content_type_charset, HttpResponse};
pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::Client;
use tracing::debug;

use crate::error::ScrapeError;

/// Default connect timeout for source requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default read timeout for source requests.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect and read timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// HTTP client with per-request header overrides and payload decoding.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the default desktop user agent.
    pub fn new(timeouts: Timeouts) -> Result<Self, ScrapeError> {
        Self::with_user_agent(timeouts, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    pub fn with_user_agent(
        timeouts: Timeouts,
        user_agent_config: Option<&str>,
    ) -> Result<Self, ScrapeError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ScrapeError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Make a GET request. Non-success statuses are errors.
    pub async fn get(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<HttpResponse, ScrapeError> {
        let mut request = self.client.get(url);
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|source| ScrapeError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();

        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                response_headers.insert(name.to_string(), v.to_string());
            }
        }

        Ok(HttpResponse {
            url: url.to_string(),
            status,
            headers: response_headers,
            response,
        })
    }

    /// Fetch a URL and decode its body as JSON or UTF-8 HTML.
    pub async fn download(&self, url: &str, download: &Download) -> Result<Payload, ScrapeError> {
        let response = self.get(url, download.headers.as_ref()).await?;
        let content_type = response.content_type().map(|s| s.to_string());
        let body = response.bytes().await?;
        Payload::decode(url, download, content_type.as_deref(), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use reqwest::header::{HeaderValue, USER_AGENT as USER_AGENT_HEADER};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new(Timeouts::default()).unwrap()
    }

    #[tokio::test]
    async fn test_download_sends_desktop_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&server)
            .await;

        let payload = client()
            .download(&format!("{}/list", server.uri()), &Download::json())
            .await
            .unwrap();
        assert_eq!(payload, Payload::Json(serde_json::json!({"ok": true})));

        // The header matcher splits on commas, so compare the raw value
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].headers.get(USER_AGENT_HEADER).unwrap(),
            USER_AGENT
        );
    }

    #[tokio::test]
    async fn test_header_override_replaces_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "app_1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT_HEADER, HeaderValue::from_static("app_1.0"));
        let payload = client()
            .download(&server.uri(), &Download::json().with_headers(headers))
            .await
            .unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client()
            .download(&server.uri(), &Download::html())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(Timeouts {
            connect: Duration::from_secs(1),
            read: Duration::from_millis(200),
        })
        .unwrap();
        let err = client
            .download(&server.uri(), &Download::json())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_html_is_transcoded() {
        let server = MockServer::start().await;
        let (gbk, _, _) = encoding_rs::GBK.encode("<p>嘻嘻哈哈</p>");
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=gbk")
                    .set_body_bytes(gbk.into_owned()),
            )
            .mount(&server)
            .await;

        let payload = client()
            .download(&server.uri(), &Download::html())
            .await
            .unwrap();
        assert_eq!(payload, Payload::Html("<p>嘻嘻哈哈</p>".to_string()));
    }
}
