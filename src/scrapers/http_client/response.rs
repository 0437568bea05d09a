//! Successful HTTP response and Content-Type helpers.

use std::collections::HashMap;

use reqwest::{Response, StatusCode};

use crate::error::ScrapeError;

/// A 2xx response whose body has not been read yet.
pub struct HttpResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub(crate) response: Response,
}

impl HttpResponse {
    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// Get response body as bytes.
    pub async fn bytes(self) -> Result<Vec<u8>, ScrapeError> {
        let url = self.url;
        self.response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|source| ScrapeError::Transport { url, source })
    }
}

/// Extract the `charset` parameter from a Content-Type header value.
pub fn content_type_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then_some(value)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_charset() {
        assert_eq!(
            content_type_charset("text/html; charset=GBK"),
            Some("GBK")
        );
        assert_eq!(
            content_type_charset(r#"text/html;Charset="utf-8""#),
            Some("utf-8")
        );
        assert_eq!(content_type_charset("text/html"), None);
        assert_eq!(content_type_charset("text/html; charset="), None);
    }
}
