//! PengFu (pengfu.com) comments.

use async_trait::async_trait;
use serde::Deserialize;

use super::{fill_template, CommentAdapter};
use crate::error::ScrapeError;
use crate::models::{Comment, FetchKey, ANONYMOUS};
use crate::scrapers::de;
use crate::scrapers::http_client::{HttpClient, Payload};

pub const COMMENT_URL: &str = "http://api1.pengfu.com/humor/getComments?id={id}";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default, deserialize_with = "de::opt_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    avatar: Option<String>,
    #[serde(default)]
    content_json: Vec<Fragment>,
    #[serde(default, deserialize_with = "de::count")]
    like: i64,
}

#[derive(Debug, Deserialize)]
struct Fragment {
    #[serde(default, deserialize_with = "de::opt_string")]
    comment_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PengFuComments {
    url_template: String,
}

impl Default for PengFuComments {
    fn default() -> Self {
        Self {
            url_template: COMMENT_URL.to_string(),
        }
    }
}

impl PengFuComments {
    pub fn with_url(template: impl Into<String>) -> Self {
        Self {
            url_template: template.into(),
        }
    }
}

#[async_trait]
impl CommentAdapter for PengFuComments {
    fn name(&self) -> &'static str {
        "PengFuComments"
    }

    async fn discover_urls(
        &self,
        _client: &HttpClient,
        key: &FetchKey,
    ) -> Result<Vec<String>, ScrapeError> {
        Ok(vec![fill_template(&self.url_template, &[("id", key.code.as_str())])])
    }

    fn parse(
        &self,
        post_id: i32,
        url: &str,
        payload: Payload,
    ) -> Result<Vec<Comment>, ScrapeError> {
        let page: Page = payload.into_typed(url)?;
        Ok(page
            .data
            .into_iter()
            .filter_map(|entry| {
                // Only the first fragment carries the comment text
                let content = entry.content_json.into_iter().next()?.comment_content?;
                let mut comment = Comment::new(post_id, content);
                comment.author = Some(entry.name.unwrap_or_else(|| ANONYMOUS.to_string()));
                comment.avatar = entry.avatar;
                comment.like_count = entry.like;
                Some(comment)
            })
            .collect())
    }
}
