//! Diesel-based comment repository for SQLite.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, warn};

use super::diesel_models::{CommentRecord, NewComment};
use super::diesel_pool::{AsyncSqlitePool, DieselError};
use super::util::{is_unique_violation, parse_datetime};
use crate::models::{Comment, StoredComment};
use crate::schema::comments;

impl From<CommentRecord> for StoredComment {
    fn from(record: CommentRecord) -> Self {
        StoredComment {
            id: record.id,
            comment: Comment {
                post_id: record.post_id,
                author: record.author,
                avatar: record.avatar,
                content: record.content,
                like_count: record.like_count,
            },
            unique_hash: record.unique_hash,
            inserted_at: parse_datetime(&record.inserted_at),
        }
    }
}

/// Comment repository with a unique index on `unique_hash`.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: AsyncSqlitePool,
}

impl DieselCommentRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a comment, returning `None` if an identical one already exists.
    pub async fn insert(&self, comment: &Comment) -> Result<Option<i32>, DieselError> {
        if comment.author.is_none() && comment.avatar.is_none() {
            warn!(
                "comment missing fields author: {:?}, avatar: {:?}",
                comment.author, comment.avatar
            );
        }

        let mut conn = self.pool.get().await?;

        let unique_hash = comment.unique_hash();
        let inserted_at = Utc::now().to_rfc3339();

        let record = NewComment {
            post_id: comment.post_id,
            author: comment.author.as_deref(),
            avatar: comment.avatar.as_deref(),
            content: &comment.content,
            like_count: comment.like_count,
            inserted_at: &inserted_at,
            unique_hash: &unique_hash,
        };

        match diesel::insert_into(comments::table)
            .values(&record)
            .execute(&mut conn)
            .await
        {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e),
        }

        let id: i32 = comments::table
            .filter(comments::unique_hash.eq(&unique_hash))
            .select(comments::id)
            .first(&mut conn)
            .await?;

        info!("store comment id: {}", id);
        Ok(Some(id))
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: i32) -> Result<Option<StoredComment>, DieselError> {
        let mut conn = self.pool.get().await?;

        comments::table
            .find(id)
            .select(CommentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(StoredComment::from))
    }
}
