//! NeiHan (neihanshequ.com) JSON feed.

use async_trait::async_trait;
use serde::Deserialize;

use super::{unix_time, PostAdapter};
use crate::error::ScrapeError;
use crate::models::{FetchKey, Post};
use crate::scrapers::de;
use crate::scrapers::http_client::{Download, HttpClient, Payload};

const SITE: &str = "内涵段子";

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: Data,
}

#[derive(Debug, Default, Deserialize)]
struct Data {
    #[serde(default)]
    data: Vec<Entry>,
}

/// Feed entries wrap the joke in `group`; ads and banners do not.
#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    group: Option<Group>,
}

#[derive(Debug, Deserialize)]
struct Group {
    #[serde(default)]
    user: User,
    #[serde(default, deserialize_with = "de::count")]
    create_time: i64,
    #[serde(default, deserialize_with = "de::opt_string")]
    text: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    comment_count: i64,
    #[serde(default, deserialize_with = "de::count")]
    digg_count: i64,
    #[serde(default, deserialize_with = "de::count")]
    bury_count: i64,
    #[serde(default, deserialize_with = "de::opt_string")]
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct User {
    #[serde(default, deserialize_with = "de::opt_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NeiHan;

impl NeiHan {
    pub fn parse_listing(&self, url: &str, payload: Payload) -> Result<Vec<Post>, ScrapeError> {
        let listing: Listing = payload.into_typed(url)?;

        let posts = listing
            .data
            .data
            .into_iter()
            .filter_map(|entry| entry.group)
            .filter_map(|group| {
                let mut post = Post::new(SITE, group.text?);
                post.author = group.user.name;
                post.avatar = group.user.avatar_url;
                if group.create_time > 0 {
                    post.published_at = unix_time(group.create_time);
                }
                post.comment_count = group.comment_count;
                post.like_count = group.digg_count;
                post.dislike_count = group.bury_count;
                post.fetch_key = group
                    .code
                    .map(|code| FetchKey::new(code).with_comment_count(group.comment_count));
                Some(post)
            })
            .collect();

        Ok(posts)
    }
}

#[async_trait]
impl PostAdapter for NeiHan {
    fn name(&self) -> &'static str {
        "NeiHan"
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_unwraps_groups() {
        let payload = Payload::Json(json!({
            "data": {
                "data": [
                    {
                        "group": {
                            "user": {"name": "段友", "avatar_url": "http://p3/a.jpg"},
                            "create_time": 1_500_000_000,
                            "text": "内涵",
                            "comment_count": 45,
                            "digg_count": 100,
                            "bury_count": 3,
                            "code": "g123"
                        }
                    },
                    {"ad": {"title": "广告"}}
                ]
            }
        }));

        let posts = NeiHan.parse_listing("http://nh", payload).unwrap();
        assert_eq!(posts.len(), 1);

        let post = &posts[0];
        assert_eq!(post.source_site, "内涵段子");
        assert_eq!(post.author.as_deref(), Some("段友"));
        assert_eq!(post.avatar.as_deref(), Some("http://p3/a.jpg"));
        assert_eq!(post.published_at.timestamp(), 1_500_000_000);
        assert_eq!(
            (post.comment_count, post.like_count, post.dislike_count),
            (45, 100, 3)
        );
        assert_eq!(
            post.fetch_key,
            Some(FetchKey::new("g123").with_comment_count(45))
        );
    }

    #[test]
    fn test_empty_feed() {
        let posts = NeiHan
            .parse_listing("http://nh", Payload::Json(json!({"message": "success"})))
            .unwrap();
        assert!(posts.is_empty());
    }
}
