//! Diesel-based post repository for SQLite.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, warn};

use super::diesel_models::{NewPost, PostRecord};
use super::diesel_pool::{AsyncSqlitePool, DieselError};
use super::util::{is_unique_violation, parse_datetime};
use crate::models::{FetchKey, Post, StoredPost};
use crate::schema::posts;

/// Convert a database record to a domain model.
impl From<PostRecord> for StoredPost {
    fn from(record: PostRecord) -> Self {
        let fetch_key = record
            .fetch_key
            .as_deref()
            .and_then(|s| serde_json::from_str::<FetchKey>(s).ok());
        StoredPost {
            id: record.id,
            post: Post {
                title: record.title,
                author: record.author,
                avatar: record.avatar,
                published_at: parse_datetime(&record.published_at),
                source_site: record.source_site,
                content: record.content,
                comment_count: record.comment_count,
                like_count: record.like_count,
                dislike_count: record.dislike_count,
                fetch_key,
            },
            content_hash: record.content_hash,
            inserted_at: parse_datetime(&record.inserted_at),
        }
    }
}

/// Post repository with a unique index on `content_hash`.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: AsyncSqlitePool,
}

impl DieselPostRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post.
    ///
    /// Returns the new row id, or `None` when a post with the same content
    /// hash is already stored.
    pub async fn insert(&self, post: &Post) -> Result<Option<i32>, DieselError> {
        if post.is_sparse() {
            warn!(
                "post missing fields author: {:?}, avatar: {:?}, content: {:?}",
                post.author, post.avatar, post.content
            );
        }

        let mut conn = self.pool.get().await?;

        let content_hash = post.content_hash();
        let published_at = post.published_at.to_rfc3339();
        let inserted_at = Utc::now().to_rfc3339();
        let fetch_key = post
            .fetch_key
            .as_ref()
            .map(|key| serde_json::to_string(key).unwrap_or_else(|_| "{}".to_string()));

        let record = NewPost {
            title: post.title.as_deref(),
            author: post.author.as_deref(),
            avatar: post.avatar.as_deref(),
            published_at: &published_at,
            source_site: &post.source_site,
            content: &post.content,
            comment_count: post.comment_count,
            like_count: post.like_count,
            dislike_count: post.dislike_count,
            fetch_key: fetch_key.as_deref(),
            inserted_at: &inserted_at,
            content_hash: &content_hash,
        };

        match diesel::insert_into(posts::table)
            .values(&record)
            .execute(&mut conn)
            .await
        {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e),
        }

        let id: i32 = posts::table
            .filter(posts::content_hash.eq(&content_hash))
            .select(posts::id)
            .first(&mut conn)
            .await?;

        info!("store post id: {}", id);
        Ok(Some(id))
    }

    /// Get a post by ID.
    pub async fn get(&self, id: i32) -> Result<Option<StoredPost>, DieselError> {
        let mut conn = self.pool.get().await?;

        posts::table
            .find(id)
            .select(PostRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(StoredPost::from))
    }

    /// Count stored posts for a source site.
    pub async fn count_by_site(&self, source_site: &str) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        posts::table
            .filter(posts::source_site.eq(source_site))
            .select(count_star())
            .first(&mut conn)
            .await
    }

    /// Count all stored posts.
    pub async fn count(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        posts::table.count().get_result(&mut conn).await
    }
}
