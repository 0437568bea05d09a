//! XiHa (xxhh.com) comments, one JSONP request per post.

use async_trait::async_trait;
use serde::Deserialize;

use super::{fill_template, CommentAdapter};
use crate::error::ScrapeError;
use crate::models::{Comment, FetchKey, ANONYMOUS};
use crate::scrapers::de;
use crate::scrapers::http_client::{Download, HttpClient, JsonpTrim, Payload};

pub const COMMENT_URL: &str =
    "http://dg.xxhh.com/api/v2/getComment.php?id={id}&sid=joke&p=1&limit=100&__jsonp__=fn";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    c: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default, deserialize_with = "de::opt_string")]
    mn: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    ml: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    c: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    fl: i64,
}

/// Comments from the xxhh.com JSONP API. One page of up to 100.
#[derive(Debug, Clone)]
pub struct XiHaComments {
    url_template: String,
}

impl Default for XiHaComments {
    fn default() -> Self {
        Self {
            url_template: COMMENT_URL.to_string(),
        }
    }
}

impl XiHaComments {
    pub fn with_url(template: impl Into<String>) -> Self {
        Self {
            url_template: template.into(),
        }
    }
}

#[async_trait]
impl CommentAdapter for XiHaComments {
    fn name(&self) -> &'static str {
        "XiHaComments"
    }

    fn download(&self) -> Download {
        Download::jsonp(JsonpTrim::CALLBACK_FN)
    }

    async fn discover_urls(
        &self,
        _client: &HttpClient,
        key: &FetchKey,
    ) -> Result<Vec<String>, ScrapeError> {
        Ok(vec![fill_template(&self.url_template, &[("id", key.code.as_str())])])
    }

    fn parse(
        &self,
        post_id: i32,
        url: &str,
        payload: Payload,
    ) -> Result<Vec<Comment>, ScrapeError> {
        let page: Page = payload.into_typed(url)?;
        Ok(page
            .c
            .into_iter()
            .filter_map(|entry| {
                let mut comment = Comment::new(post_id, entry.c?);
                comment.author = Some(entry.mn.unwrap_or_else(|| ANONYMOUS.to_string()));
                comment.avatar = entry.ml;
                comment.like_count = entry.fl;
                Some(comment)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::http_client::Timeouts;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_defaults_anonymous_author() {
        let payload = Payload::Json(json!({
            "c": [
                {"mn": "哈友", "ml": "http://img/a.png", "c": "笑死", "fl": 3},
                {"c": "匿名评论"},
                {"mn": "无内容"}
            ]
        }));
        let comments = XiHaComments::default().parse(42, "http://x", payload).unwrap();
        assert_eq!(comments.len(), 2);

        assert_eq!(comments[0].post_id, 42);
        assert_eq!(comments[0].author.as_deref(), Some("哈友"));
        assert_eq!(comments[0].avatar.as_deref(), Some("http://img/a.png"));
        assert_eq!(comments[0].like_count, 3);

        assert_eq!(comments[1].author.as_deref(), Some(ANONYMOUS));
        assert!(comments[1].avatar.is_none());
        assert_eq!(comments[1].like_count, 0);
    }

    #[tokio::test]
    async fn test_run_unwraps_jsonp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getComment.php"))
            .and(query_param("id", "111"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"fn({"c":[{"mn":"a","c":"b"}]})"#),
            )
            .mount(&server)
            .await;

        let adapter = XiHaComments::with_url(format!("{}/getComment.php?id={{id}}", server.uri()));
        let client = HttpClient::new(Timeouts::default()).unwrap();
        let comments = adapter.run(&client, 7, &FetchKey::new("111")).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].post_id, 7);
        assert_eq!(comments[0].content, "b");
    }
}
