//! QiuShiBaiKe mobile app API.
//!
//! The API only answers clients that look like the Android app, so requests
//! replace the desktop user agent with the app's header set.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use super::{unix_time, PostAdapter};
use crate::error::ScrapeError;
use crate::models::Post;
use crate::scrapers::de;
use crate::scrapers::http_client::{Download, HttpClient, Payload};

const SITE: &str = "糗事百科";

/// Headers captured from the Android client.
const APP_HEADERS: &[(&str, &str)] = &[
    ("user-agent", "qiushibalke_10.8.1_WIFI_auto_19"),
    ("source", "android_10.8.1"),
    (
        "model",
        "Xiaomi/hydrogen/hydrogen:6.0.1/MMB29M/V7.5.6.0.MBCCNDE:user/release-keys",
    ),
    ("uuid", "IMEI_8728c26518fa3ae795a7f787073d375f"),
    (
        "deviceidinfo",
        r#"{"DEVICEID": "862535037295724","SIMNO": "89860112817005617959","IMSI": "460012225499106","ANDROID_ID": "27dafccd6e32bfb2","SDK_INT": 23,"SERIAL"a882d7f9","MAC": "02:00:00:00:00:00","RANDOM": ""}"#,
    ),
];

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    user: Option<User>,
    #[serde(default, deserialize_with = "de::count")]
    created_at: i64,
    #[serde(default, deserialize_with = "de::opt_string")]
    content: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    comments_count: i64,
    #[serde(default)]
    votes: Option<Votes>,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(default, deserialize_with = "de::opt_string")]
    login: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Votes {
    #[serde(default, deserialize_with = "de::count")]
    up: i64,
    #[serde(default, deserialize_with = "de::count")]
    down: i64,
}

/// Prefix protocol-relative URLs with `http:`.
pub fn normalize_avatar(avatar: &str) -> String {
    if avatar.starts_with("//") {
        format!("http:{}", avatar)
    } else {
        avatar.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QiuShi;

impl QiuShi {
    fn app_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        for &(name, value) in APP_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    pub fn parse_listing(&self, url: &str, payload: Payload) -> Result<Vec<Post>, ScrapeError> {
        let listing: Listing = payload.into_typed(url)?;

        let posts = listing
            .items
            .into_iter()
            .filter_map(|item| {
                // Entries without a user or avatar are promotions
                let user = item.user?;
                let avatar = user.thumb?;
                let mut post = Post::new(SITE, item.content?);
                post.author = user.login;
                post.avatar = Some(normalize_avatar(&avatar));
                if item.created_at > 0 {
                    post.published_at = unix_time(item.created_at);
                }
                post.comment_count = item.comments_count;
                if let Some(votes) = item.votes {
                    post.like_count = votes.up;
                    post.dislike_count = votes.down.saturating_abs();
                }
                Some(post)
            })
            .collect();

        Ok(posts)
    }
}

#[async_trait]
impl PostAdapter for QiuShi {
    fn name(&self) -> &'static str {
        "QiuShi"
    }

    fn download(&self) -> Download {
        Download::json().with_headers(Self::app_headers())
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
