//! Data models for jokecrawl.

mod comment;
mod post;

pub use comment::{Comment, StoredComment, ANONYMOUS};
pub use post::{FetchKey, Post, StoredPost};
