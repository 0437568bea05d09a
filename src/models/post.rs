//! Joke post model.
//!
//! Posts are identified by a SHA-256 hash of their content, so the same joke
//! scraped twice (or from two sites) collapses to a single stored record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Per-post data needed to fetch that post's comments from its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchKey {
    /// Source-side content id.
    pub code: String,
    /// Comment count known at listing time (used for pagination without a probe).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<i64>,
}

impl FetchKey {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            comment_count: None,
        }
    }

    pub fn with_comment_count(mut self, count: i64) -> Self {
        self.comment_count = Some(count);
        self
    }
}

/// A joke post scraped from a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: Option<String>,
    pub author: Option<String>,
    pub avatar: Option<String>,
    /// Publication time; fetch time when the source has none.
    pub published_at: DateTime<Utc>,
    /// Human-readable origin tag, e.g. "捧腹网".
    pub source_site: String,
    pub content: String,
    pub comment_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub fetch_key: Option<FetchKey>,
}

impl Post {
    /// Create a post with every optional field defaulted.
    pub fn new(source_site: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: None,
            author: None,
            avatar: None,
            published_at: Utc::now(),
            source_site: source_site.into(),
            content: content.into(),
            comment_count: 0,
            like_count: 0,
            dislike_count: 0,
            fetch_key: None,
        }
    }

    /// Compute SHA-256 hash of post content.
    pub fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Uniqueness key used by the store.
    pub fn content_hash(&self) -> String {
        Self::compute_hash(&self.content)
    }

    /// True when none of the identifying fields were scraped.
    pub fn is_sparse(&self) -> bool {
        self.author.is_none() && self.avatar.is_none() && self.content.is_empty()
    }
}

/// A post as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub id: i32,
    pub post: Post,
    pub content_hash: String,
    pub inserted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_depends_only_on_content() {
        let mut a = Post::new("捧腹网", "一个笑话");
        a.author = Some("alice".to_string());
        a.like_count = 10;
        let mut b = Post::new("挖段子", "一个笑话");
        b.title = Some("title".to_string());

        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), Post::new("捧腹网", "另一个").content_hash());
    }

    #[test]
    fn test_compute_hash_is_hex_sha256() {
        assert_eq!(
            Post::compute_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fetch_key_serialization_skips_missing_count() {
        let key = FetchKey::new("abc");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"{"code":"abc"}"#);

        let key = FetchKey::new("abc").with_comment_count(41);
        let parsed: FetchKey =
            serde_json::from_str(&serde_json::to_string(&key).unwrap()).unwrap();
        assert_eq!(parsed.comment_count, Some(41));
    }
}
