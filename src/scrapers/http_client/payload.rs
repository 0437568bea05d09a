//! Download options and decoded payloads.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ScrapeError;

/// How a response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Html,
}

/// Bytes to drop from each end of a body before decoding.
///
/// A JSONP response like `fn({...})` unwraps with `prefix: 3, suffix: 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonpTrim {
    pub prefix: usize,
    pub suffix: usize,
}

impl JsonpTrim {
    /// The `fn(...)` callback wrapper used by the xxhh.com endpoints.
    pub const CALLBACK_FN: JsonpTrim = JsonpTrim {
        prefix: 3,
        suffix: 1,
    };

    /// Slice the wrapped body, or `None` if it is too short.
    pub fn apply<'a>(&self, body: &'a [u8]) -> Option<&'a [u8]> {
        let end = body.len().checked_sub(self.suffix)?;
        if self.prefix > end {
            return None;
        }
        Some(&body[self.prefix..end])
    }
}

/// Per-request download settings.
#[derive(Debug, Clone)]
pub struct Download {
    pub format: PayloadFormat,
    /// Replaces the client's default headers when set.
    pub headers: Option<HeaderMap>,
    pub trim: Option<JsonpTrim>,
}

impl Download {
    pub fn json() -> Self {
        Self {
            format: PayloadFormat::Json,
            headers: None,
            trim: None,
        }
    }

    pub fn html() -> Self {
        Self {
            format: PayloadFormat::Html,
            headers: None,
            trim: None,
        }
    }

    /// JSON wrapped in a JSONP callback.
    pub fn jsonp(trim: JsonpTrim) -> Self {
        Self {
            trim: Some(trim),
            ..Self::json()
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    /// UTF-8 HTML text.
    Html(String),
}

impl Payload {
    /// Decode raw bytes according to download settings.
    pub fn decode(
        url: &str,
        download: &Download,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Self, ScrapeError> {
        let body = match download.trim {
            Some(trim) => trim.apply(body).ok_or_else(|| {
                ScrapeError::decode(url, format!("body of {} bytes too short to trim", body.len()))
            })?,
            None => body,
        };

        match download.format {
            PayloadFormat::Json => serde_json::from_slice(body)
                .map(Payload::Json)
                .map_err(|e| ScrapeError::decode(url, e)),
            PayloadFormat::Html => Ok(Payload::Html(super::charset::decode_html(
                content_type,
                body,
            ))),
        }
    }

    /// Deserialize a JSON payload into a typed upstream shape.
    pub fn into_typed<T: DeserializeOwned>(self, url: &str) -> Result<T, ScrapeError> {
        match self {
            Payload::Json(value) => {
                serde_json::from_value(value).map_err(|e| ScrapeError::decode(url, e))
            }
            Payload::Html(_) => Err(ScrapeError::decode(url, "expected JSON, got HTML")),
        }
    }

    /// Take the HTML text out of the payload.
    pub fn into_html(self, url: &str) -> Result<String, ScrapeError> {
        match self {
            Payload::Html(html) => Ok(html),
            Payload::Json(_) => Err(ScrapeError::decode(url, "expected HTML, got JSON")),
        }
    }

    /// True for JSON `null`, `{}` and `[]` bodies.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Json(serde_json::Value::Null) => true,
            Payload::Json(serde_json::Value::Object(map)) => map.is_empty(),
            Payload::Json(serde_json::Value::Array(items)) => items.is_empty(),
            Payload::Json(_) => false,
            Payload::Html(html) => html.trim().is_empty(),
        }
    }
}
