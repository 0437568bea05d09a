//! NetEase (3g.163.com) joke channel.

use async_trait::async_trait;
use serde::Deserialize;

use super::PostAdapter;
use crate::error::ScrapeError;
use crate::models::{FetchKey, Post};
use crate::scrapers::de;
use crate::scrapers::http_client::{Download, HttpClient, Payload};

/// Site tag used when an entry does not name its source.
const SITE: &str = "网易";

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(rename = "段子", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    #[serde(default, deserialize_with = "de::count")]
    imgsum: i64,
    #[serde(default, deserialize_with = "de::opt_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    source: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    digest: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    reply_count: i64,
    #[serde(default, deserialize_with = "de::count")]
    up_times: i64,
    #[serde(default, deserialize_with = "de::count")]
    down_times: i64,
    #[serde(default, deserialize_with = "de::opt_string")]
    docid: Option<String>,
}

/// Text-only jokes from the NetEase JSON channel feed.
#[derive(Debug, Clone, Default)]
pub struct NetEase;

impl NetEase {
    pub fn parse_listing(&self, url: &str, payload: Payload) -> Result<Vec<Post>, ScrapeError> {
        let listing: Listing = payload.into_typed(url)?;

        let posts = listing
            .items
            .into_iter()
            // Entries with embedded images are not plain-text jokes
            .filter(|item| item.imgsum == 0)
            .filter_map(|item| {
                let content = item.digest?;
                let mut post = Post::new(item.source.unwrap_or_else(|| SITE.to_string()), content);
                post.title = item.title;
                post.comment_count = item.reply_count;
                post.like_count = item.up_times;
                post.dislike_count = item.down_times;
                post.fetch_key = item.docid.map(FetchKey::new);
                Some(post)
            })
            .collect();

        Ok(posts)
    }
}

#[async_trait]
impl PostAdapter for NetEase {
    fn name(&self) -> &'static str {
        "NetEase"
    }

    fn download(&self) -> Download {
        Download::json()
    }

    async fn parse(
        &self,
        _client: &HttpClient,
        url: &str,
        payload: Payload,
    ) -> Result<Vec<Post>, ScrapeError> {
        self.parse_listing(url, payload)
    }
}
