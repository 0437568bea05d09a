//! Forwarding of newly stored records to the downstream ingestion API.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ScrapeError;
use crate::models::{StoredComment, StoredPost};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Insert times are shifted to UTC+8 wall-clock time before sending.
const INSERT_OFFSET_HOURS: i64 = 8;

/// Timestamp layout expected by the ingestion API.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn format_insert_time(time: DateTime<Utc>) -> String {
    format_time(time + ChronoDuration::hours(INSERT_OFFSET_HOURS))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub txt: String,
}

/// Body of `POST /store/joke`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JokeBody {
    pub title: String,
    pub unique_id: String,
    pub publish_site: Option<String>,
    pub publish_time: String,
    pub insert_time: String,
    pub author: Option<String>,
    pub author_icon: Option<String>,
    pub site_icon: Option<String>,
    pub source_id: i64,
    pub online: bool,
    pub content: Vec<ContentBlock>,
    pub like: i64,
    pub dislike: i64,
    pub comment: i64,
}

impl JokeBody {
    pub fn new(stored: &StoredPost, source_id: i64) -> Self {
        let post = &stored.post;
        // Title mirrors the content and publish site mirrors the author
        Self {
            title: post.content.clone(),
            unique_id: stored.id.to_string(),
            publish_site: post.author.clone(),
            publish_time: format_time(post.published_at),
            insert_time: format_insert_time(stored.inserted_at),
            author: post.author.clone(),
            author_icon: post.avatar.clone(),
            site_icon: post.avatar.clone(),
            source_id,
            online: true,
            content: vec![ContentBlock {
                txt: post.content.clone(),
            }],
            like: post.like_count,
            dislike: post.dislike_count,
            comment: post.comment_count,
        }
    }
}

/// Body of `POST /store/comment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentBody {
    pub content: String,
    pub commend: i64,
    pub insert_time: String,
    pub user_name: Option<String>,
    pub avatar: Option<String>,
    pub foreign_id: String,
    pub unique_id: String,
}

impl CommentBody {
    pub fn new(stored: &StoredComment) -> Self {
        let comment = &stored.comment;
        Self {
            content: comment.content.clone(),
            commend: comment.like_count,
            insert_time: format_insert_time(stored.inserted_at),
            user_name: comment.author.clone(),
            avatar: comment.avatar.clone(),
            foreign_id: comment.post_id.to_string(),
            unique_id: stored.unique_hash.clone(),
        }
    }
}

/// Client for the ingestion API.
#[derive(Clone)]
pub struct IngestClient {
    client: Client,
    base_url: String,
    source_ids: HashMap<String, i64>,
}

impl IngestClient {
    pub fn new(base_url: &str, source_ids: HashMap<String, i64>) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| ScrapeError::config(format!("failed to create ingest client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            source_ids,
        })
    }

    /// Ingestion source id for a site tag.
    pub fn source_id(&self, site: &str) -> Option<i64> {
        self.source_ids.get(site).copied()
    }

    /// Send a stored post. Returns `false` without a request when the post's
    /// site has no ingestion source id.
    pub async fn forward_post(&self, stored: &StoredPost) -> Result<bool, ScrapeError> {
        let Some(source_id) = self.source_id(&stored.post.source_site) else {
            debug!(
                "not forwarding post {}: no source id for {}",
                stored.id, stored.post.source_site
            );
            return Ok(false);
        };
        self.send("store/joke", &JokeBody::new(stored, source_id)).await?;
        Ok(true)
    }

    pub async fn forward_comment(&self, stored: &StoredComment) -> Result<(), ScrapeError> {
        self.send("store/comment", &CommentBody::new(stored)).await
    }

    async fn send<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<(), ScrapeError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ScrapeError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let reply = response.text().await.unwrap_or_default();
        info!("{} -> {}", url, reply);
        Ok(())
    }
}
