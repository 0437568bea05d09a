//! Joke comment model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Author name used by sources that show anonymous commenters.
pub const ANONYMOUS: &str = "匿名";

/// A comment attached to a stored post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Store id of the owning post.
    pub post_id: i32,
    pub author: Option<String>,
    pub avatar: Option<String>,
    pub content: String,
    pub like_count: i64,
}

impl Comment {
    pub fn new(post_id: i32, content: impl Into<String>) -> Self {
        Self {
            post_id,
            author: None,
            avatar: None,
            content: content.into(),
            like_count: 0,
        }
    }

    /// Hash of author followed by content. A missing author contributes nothing.
    pub fn compute_hash(author: Option<&str>, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(author.unwrap_or("").as_bytes());
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Uniqueness key used by the store.
    pub fn unique_hash(&self) -> String {
        Self::compute_hash(self.author.as_deref(), &self.content)
    }
}

/// A comment as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredComment {
    pub id: i32,
    pub comment: Comment,
    pub unique_hash: String,
    pub inserted_at: DateTime<Utc>,
}
