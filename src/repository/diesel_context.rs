//! Diesel database context for managing connections and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::diesel_comment::DieselCommentRepository;
use super::diesel_pool::{AsyncSqlitePool, DieselError};
use super::diesel_post::DieselPostRepository;

/// Diesel database context that provides repository access.
///
/// Create one context per command, then use it to access all repositories.
///
/// # Example
/// ```ignore
/// let ctx = DieselDbContext::new(&db_path);
/// ctx.init_schema().await?;
/// let id = ctx.posts().insert(&post).await?;
/// ```
#[derive(Clone)]
pub struct DieselDbContext {
    pool: AsyncSqlitePool,
}

impl DieselDbContext {
    /// Create a new database context from a file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Get a post repository.
    pub fn posts(&self) -> DieselPostRepository {
        DieselPostRepository::new(self.pool.clone())
    }

    /// Get a comment repository.
    pub fn comments(&self) -> DieselCommentRepository {
        DieselCommentRepository::new(self.pool.clone())
    }

    /// Initialize the database schema.
    ///
    /// This creates the necessary tables if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            -- Posts table
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                author TEXT,
                avatar TEXT,
                published_at TEXT NOT NULL,
                source_site TEXT NOT NULL,
                content TEXT NOT NULL,
                comment_count INTEGER NOT NULL DEFAULT 0,
                like_count INTEGER NOT NULL DEFAULT 0,
                dislike_count INTEGER NOT NULL DEFAULT 0,
                fetch_key TEXT,
                inserted_at TEXT NOT NULL,
                content_hash TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_posts_content_hash ON posts(content_hash);
            CREATE INDEX IF NOT EXISTS idx_posts_source_site ON posts(source_site);

            -- Comments table
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL REFERENCES posts(id),
                author TEXT,
                avatar TEXT,
                content TEXT NOT NULL,
                like_count INTEGER NOT NULL DEFAULT 0,
                inserted_at TEXT NOT NULL,
                unique_hash TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_comments_unique_hash ON comments(unique_hash);
            CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);
            "#,
        )
        .await
    }
}
