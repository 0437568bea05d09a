//! NeiHan comments, paged by the comment count carried in the fetch key.

use async_trait::async_trait;
use serde::Deserialize;

use super::{fill_template, page_count, CommentAdapter};
use crate::error::ScrapeError;
use crate::models::{Comment, FetchKey, ANONYMOUS};
use crate::scrapers::de;
use crate::scrapers::http_client::{HttpClient, Payload};

pub const COMMENT_URL: &str =
    "http://neihanshequ.com/m/api/get_essay_comments/?group_id={id}&offset={offset}";

/// Comments returned per page.
pub const PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
struct Page {
    data: Data,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(default)]
    recent_comments: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default, deserialize_with = "de::opt_string")]
    user_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    avatar_url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    text: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    digg_count: i64,
}

/// Paged comments for a NeiHan group. The page count comes from the
/// comment count recorded with the post, so no probe request is needed.
#[derive(Debug, Clone)]
pub struct NeiHanComments {
    url_template: String,
}

impl Default for NeiHanComments {
    fn default() -> Self {
        Self {
            url_template: COMMENT_URL.to_string(),
        }
    }
}

impl NeiHanComments {
    pub fn with_url(template: impl Into<String>) -> Self {
        Self {
            url_template: template.into(),
        }
    }

    pub fn page_urls(&self, key: &FetchKey) -> Vec<String> {
        let pages = page_count(key.comment_count.unwrap_or(0), PAGE_SIZE);
        (0..pages)
            .map(|page| {
                let offset = (page * PAGE_SIZE).to_string();
                fill_template(
                    &self.url_template,
                    &[("id", key.code.as_str()), ("offset", offset.as_str())],
                )
            })
            .collect()
    }
}

#[async_trait]
impl CommentAdapter for NeiHanComments {
    fn name(&self) -> &'static str {
        "NeiHanComments"
    }

    async fn discover_urls(
        &self,
        _client: &HttpClient,
        key: &FetchKey,
    ) -> Result<Vec<String>, ScrapeError> {
        Ok(self.page_urls(key))
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
            .recent_comments
            .into_iter()
            .filter_map(|entry| {
                let mut comment = Comment::new(post_id, entry.text?);
                comment.author = Some(entry.user_name.unwrap_or_else(|| ANONYMOUS.to_string()));
                comment.avatar = entry.avatar_url;
                comment.like_count = entry.digg_count;
                Some(comment)
            })
            .collect())
    }
}
