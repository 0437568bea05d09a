//! NetEase comments. A probe request sizes the listing, then every page is fetched.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{fill_template, page_count, CommentAdapter};
use crate::error::ScrapeError;
use crate::models::{Comment, FetchKey};
use crate::scrapers::de;
use crate::scrapers::http_client::{Download, HttpClient, Payload};

pub const COMMENT_URL: &str = "http://comment.api.163.com/api/v1/products/a2869674571f77b5a0867c3d71db5856/threads/{id}/app/comments/newList?offset={offset}&limit={limit}";

/// Comments requested per page.
pub const PAGE_SIZE: i64 = 40;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Probe {
    #[serde(default, deserialize_with = "de::count")]
    new_list_size: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    /// Reply chains as comma-separated ids; the first id is the comment itself.
    #[serde(default)]
    comment_ids: Vec<String>,
    #[serde(default)]
    comments: HashMap<String, Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    user: User,
    #[serde(default, deserialize_with = "de::opt_string")]
    content: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    vote: i64,
}

#[derive(Debug, Default, Deserialize)]
struct User {
    #[serde(default, deserialize_with = "de::opt_string")]
    nickname: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    avatar: Option<String>,
}

/// Drop NetEase's placeholder avatar.
pub fn filter_avatar(avatar: Option<String>) -> Option<String> {
    avatar.filter(|logo| !(logo.contains("netease.com") && logo.contains("noface")))
}

/// Paged comments for a NetEase thread. The page count is read from a probe
/// request for the first page.
#[derive(Debug, Clone)]
pub struct NetEaseComments {
    url_template: String,
}

impl Default for NetEaseComments {
    fn default() -> Self {
        Self {
            url_template: COMMENT_URL.to_string(),
        }
    }
}

impl NetEaseComments {
    pub fn with_url(template: impl Into<String>) -> Self {
        Self {
            url_template: template.into(),
        }
    }

    fn page_url(&self, code: &str, page: i64) -> String {
        let offset = (page * PAGE_SIZE).to_string();
        let limit = PAGE_SIZE.to_string();
        fill_template(
            &self.url_template,
            &[
                ("id", code),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ],
        )
    }

    /// Page URLs for a probe response. An empty probe means no pages.
    pub fn page_urls(&self, code: &str, probe_url: &str, probe: Payload) -> Result<Vec<String>, ScrapeError> {
        if probe.is_empty() {
            return Ok(Vec::new());
        }
        let probe: Probe = probe.into_typed(probe_url)?;
        let pages = page_count(probe.new_list_size, PAGE_SIZE);
        Ok((0..pages).map(|page| self.page_url(code, page)).collect())
    }
}

#[async_trait]
impl CommentAdapter for NetEaseComments {
    fn name(&self) -> &'static str {
        "NetEaseComments"
    }

    async fn discover_urls(
        &self,
        client: &HttpClient,
        key: &FetchKey,
    ) -> Result<Vec<String>, ScrapeError> {
        let probe_url = self.page_url(&key.code, 0);
        debug!("{}: probing {}", self.name(), probe_url);
        let probe = client.download(&probe_url, &Download::json()).await?;
        self.page_urls(&key.code, &probe_url, probe)
    }

    fn parse(
        &self,
        post_id: i32,
        url: &str,
        payload: Payload,
    ) -> Result<Vec<Comment>, ScrapeError> {
        let mut page: Page = payload.into_typed(url)?;

        let mut seen = HashSet::new();
        let mut comments = Vec::new();
        for chain in &page.comment_ids {
            let id = chain.split(',').next().unwrap_or_default();
            if !seen.insert(id.to_string()) {
                continue;
            }
            let Some(entry) = page.comments.remove(id) else {
                continue;
            };
            let Some(content) = entry.content else {
                continue;
            };
            let mut comment = Comment::new(post_id, content);
            comment.author = entry.user.nickname;
            comment.avatar = filter_avatar(entry.user.avatar);
            comment.like_count = entry.vote;
            comments.push(comment);
        }

        Ok(comments)
    }
}
