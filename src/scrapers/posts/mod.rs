//! Post adapters, one per upstream site.
//!
//! Every adapter follows the same discover → fetch → parse pipeline driven
//! by [`PostAdapter::run`]; only the payload format and the field mapping
//! differ between sites.

mod neihan;
mod netease;
mod pengfu;
mod qiushi;
mod waduanzi;
mod xiha;

pub use neihan::NeiHan;
pub use netease::NetEase;
pub use pengfu::PengFu;
pub use qiushi::QiuShi;
pub use waduanzi::WaDuanZi;
pub use xiha::XiHa;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::http_client::{Download, HttpClient, Payload};
use crate::error::ScrapeError;
use crate::models::Post;

/// A source of joke posts.
#[async_trait]
pub trait PostAdapter: Send + Sync {
    /// Adapter name used in logs.
    fn name(&self) -> &'static str;

    /// How listing pages are requested and decoded.
    fn download(&self) -> Download;

    /// URLs to fetch for one listing batch.
    fn discover_urls(&self, seed_url: &str) -> Vec<String> {
        vec![seed_url.to_string()]
    }

    async fn fetch(&self, client: &HttpClient, url: &str) -> Result<Payload, ScrapeError> {
        client.download(url, &self.download()).await
    }

    /// Map one payload to posts. The client is available for sources that
    /// need a follow-up request to complete their records.
    async fn parse(
        &self,
        client: &HttpClient,
        url: &str,
        payload: Payload,
    ) -> Result<Vec<Post>, ScrapeError>;

    async fn run(&self, client: &HttpClient, seed_url: &str) -> Result<Vec<Post>, ScrapeError> {
        let mut posts = Vec::new();
        for url in self.discover_urls(seed_url) {
            debug!("{}: fetching {}", self.name(), url);
            let payload = self.fetch(client, &url).await?;
            posts.extend(self.parse(client, &url, payload).await?);
        }
        info!("{}: {}", self.name(), posts.len());
        Ok(posts)
    }
}

/// The fixed set of post adapters, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSourceKind {
    NetEase,
    NeiHan,
    QiuShi,
    XiHa,
    PengFu,
    WaDuanZi,
}

impl PostSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetEase => "netease",
            Self::NeiHan => "neihan",
            Self::QiuShi => "qiushi",
            Self::XiHa => "xiha",
            Self::PengFu => "pengfu",
            Self::WaDuanZi => "waduanzi",
        }
    }

    /// Build the adapter, compiling any selector tables it uses.
    pub fn build(&self) -> Result<Box<dyn PostAdapter>, ScrapeError> {
        Ok(match self {
            Self::NetEase => Box::new(NetEase),
            Self::NeiHan => Box::new(NeiHan),
            Self::QiuShi => Box::new(QiuShi),
            Self::XiHa => Box::new(XiHa::new()?),
            Self::PengFu => Box::new(PengFu::new()?),
            Self::WaDuanZi => Box::new(WaDuanZi::new()?),
        })
    }
}

/// Convert a unix timestamp, falling back to now when out of range.
pub(crate) fn unix_time(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_else(Utc::now)
}
