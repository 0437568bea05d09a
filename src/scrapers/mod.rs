//! Site adapters for joke posts and their comments.

pub mod comments;
pub mod de;
pub mod extract;
pub mod http_client;
pub mod posts;

pub use comments::{CommentAdapter, CommentSourceKind};
pub use http_client::{Download, HttpClient, Payload, Timeouts};
pub use posts::{PostAdapter, PostSourceKind};
