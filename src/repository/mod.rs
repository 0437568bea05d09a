//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! against a SQLite backend. Uniqueness of posts and comments is enforced
//! by unique indexes; duplicate inserts are reported as `None`, not errors.

pub mod diesel_comment;
pub mod diesel_context;
pub mod diesel_models;
pub mod diesel_pool;
pub mod diesel_post;

// Utilities
pub mod util;

pub use diesel_comment::DieselCommentRepository;
pub use diesel_context::DieselDbContext;
pub use diesel_pool::{AsyncSqlitePool, DieselError};
pub use diesel_post::DieselPostRepository;
