//! Comment adapters, keyed by the post source they belong to.
//!
//! A comment adapter turns a post's [`FetchKey`] into one or more comment
//! pages. The owning post's store id is passed explicitly and copied onto
//! every comment produced.

mod neihan;
mod netease;
mod pengfu;
mod xiha;

pub use neihan::NeiHanComments;
pub use netease::NetEaseComments;
pub use pengfu::PengFuComments;
pub use xiha::XiHaComments;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::http_client::{Download, HttpClient, Payload};
use crate::error::ScrapeError;
use crate::models::{Comment, FetchKey};

#[async_trait]
pub trait CommentAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn download(&self) -> Download {
        Download::json()
    }

    /// Comment page URLs for one post. May issue probe requests.
    async fn discover_urls(
        &self,
        client: &HttpClient,
        key: &FetchKey,
    ) -> Result<Vec<String>, ScrapeError>;

    async fn fetch(&self, client: &HttpClient, url: &str) -> Result<Payload, ScrapeError> {
        client.download(url, &self.download()).await
    }

    /// Map one comment page to comments owned by `post_id`.
    fn parse(&self, post_id: i32, url: &str, payload: Payload)
        -> Result<Vec<Comment>, ScrapeError>;

    async fn run(
        &self,
        client: &HttpClient,
        post_id: i32,
        key: &FetchKey,
    ) -> Result<Vec<Comment>, ScrapeError> {
        let mut comments = Vec::new();
        for url in self.discover_urls(client, key).await? {
            debug!("{}: fetching {}", self.name(), url);
            let payload = self.fetch(client, &url).await?;
            comments.extend(self.parse(post_id, &url, payload)?);
        }
        info!("{}: {}", self.name(), comments.len());
        Ok(comments)
    }
}

/// The fixed set of comment adapters, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSourceKind {
    XiHa,
    NeiHan,
    NetEase,
    PengFu,
}

impl CommentSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XiHa => "xiha",
            Self::NeiHan => "neihan",
            Self::NetEase => "netease",
            Self::PengFu => "pengfu",
        }
    }

    pub fn build(&self) -> Box<dyn CommentAdapter> {
        match self {
            Self::XiHa => Box::new(XiHaComments::default()),
            Self::NeiHan => Box::new(NeiHanComments::default()),
            Self::NetEase => Box::new(NetEaseComments::default()),
            Self::PengFu => Box::new(PengFuComments::default()),
        }
    }
}

/// Number of pages needed to cover `total` items, `per_page` at a time.
pub(crate) fn page_count(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 0;
    }
    (total + per_page - 1) / per_page
}

/// Fill `{name}` placeholders in a URL template.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |url, (name, value)| {
            url.replace(&format!("{{{}}}", name), value)
        })
}
