//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for database operations.
//! Timestamps are stored as RFC 3339 text.

use diesel::prelude::*;

use crate::schema;

/// Post record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PostRecord {
    pub id: i32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub avatar: Option<String>,
    pub published_at: String,
    pub source_site: String,
    pub content: String,
    pub comment_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub fetch_key: Option<String>,
    pub inserted_at: String,
    pub content_hash: String,
}

/// New post for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::posts)]
pub struct NewPost<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub avatar: Option<&'a str>,
    pub published_at: &'a str,
    pub source_site: &'a str,
    pub content: &'a str,
    pub comment_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub fetch_key: Option<&'a str>,
    pub inserted_at: &'a str,
    pub content_hash: &'a str,
}

/// Comment record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CommentRecord {
    pub id: i32,
    pub post_id: i32,
    pub author: Option<String>,
    pub avatar: Option<String>,
    pub content: String,
    pub like_count: i64,
    pub inserted_at: String,
    pub unique_hash: String,
}

/// New comment for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::comments)]
pub struct NewComment<'a> {
    pub post_id: i32,
    pub author: Option<&'a str>,
    pub avatar: Option<&'a str>,
    pub content: &'a str,
    pub like_count: i64,
    pub inserted_at: &'a str,
    pub unique_hash: &'a str,
}
