//! XiHa (xxhh.com) HTML listing.
//!
//! Listing pages carry only text and author; the counters come from a
//! second JSONP request keyed by the ids scraped from the page.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::PostAdapter;
use crate::error::ScrapeError;
use crate::models::{FetchKey, Post};
use crate::scrapers::de::value_to_count;
use crate::scrapers::extract::{non_empty, section_selector, Descriptor, FieldRule};
use crate::scrapers::http_client::{Download, HttpClient, JsonpTrim, Payload};

const SITE: &str = "嘻嘻哈哈";

/// Counter endpoint; `{ids}` is replaced with the comma-joined post ids.
pub const METADATA_URL: &str = "http://dg.xxhh.com/getcnums/?__jsonp__=fn&ids={ids}";

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    /// `[comment, like, dislike]` rows in request id order.
    #[serde(default)]
    d: Vec<Vec<Value>>,
}

/// A post scraped from the listing, still keyed by its page id.
#[derive(Debug, Clone)]
pub struct Scraped {
    pub id: String,
    pub post: Post,
}

#[derive(Debug, Clone)]
pub struct XiHa {
    sections: Selector,
    id: FieldRule,
    content: FieldRule,
    author: FieldRule,
    avatar: FieldRule,
    metadata_url: String,
}

impl XiHa {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            sections: section_selector("div.min > div.section")?,
            id: FieldRule::attr(Descriptor::select("div.comment"), "id")?,
            content: FieldRule::text(Descriptor::select("div.article > pre"))?,
            author: FieldRule::text(Descriptor::select("div.user-info-username > a"))?,
            avatar: FieldRule::attr(Descriptor::select("div.user-avatar40 > a > img"), "src")?,
            metadata_url: METADATA_URL.to_string(),
        })
    }

    /// Point the counter lookup at another endpoint.
    pub fn with_metadata_url(mut self, template: impl Into<String>) -> Self {
        self.metadata_url = template.into();
        self
    }

    /// Split the listing into posts without counters.
    pub fn scrape(&self, html: &str) -> Vec<Scraped> {
        let document = Html::parse_document(html);
        document
            .select(&self.sections)
            .map(|section| {
                let mut post = Post::new(SITE, self.content.extract(section));
                post.author = non_empty(self.author.extract(section));
                post.avatar = non_empty(self.avatar.extract(section));
                let id = self.id.extract(section).replace("comment-", "");
                Scraped { id, post }
            })
            .collect()
    }

    async fn fetch_metadata(
        &self,
        client: &HttpClient,
        ids: &[&str],
    ) -> Result<Vec<Vec<Value>>, ScrapeError> {
        let url = self.metadata_url.replace("{ids}", &ids.join(","));
        debug!("XiHa: fetching counters {}", url);
        let metadata: Metadata = client
            .download(&url, &Download::jsonp(JsonpTrim::CALLBACK_FN))
            .await?
            .into_typed(&url)?;
        Ok(metadata.d)
    }

    /// Fill counters row by row and turn the page id into the fetch key.
    pub fn apply_metadata(scraped: Vec<Scraped>, rows: &[Vec<Value>]) -> Vec<Post> {
        scraped
            .into_iter()
            .enumerate()
            .map(|(i, Scraped { id, mut post })| {
                if let Some(row) = rows.get(i) {
                    let count = |n: usize| row.get(n).map(value_to_count).unwrap_or(0);
                    post.comment_count = count(0);
                    post.like_count = count(1);
                    post.dislike_count = count(2);
                }
                post.fetch_key = Some(FetchKey::new(id));
                post
            })
            .collect()
    }
}

#[async_trait]
impl PostAdapter for XiHa {
    fn name(&self) -> &'static str {
        "XiHa"
    }

    fn download(&self) -> Download {
        Download::html()
    }

    async fn parse(
        &self,
        client: &HttpClient,
        url: &str,
        payload: Payload,
    ) -> Result<Vec<Post>, ScrapeError> {
        let scraped = self.scrape(&payload.into_html(url)?);
        if scraped.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = scraped.iter().map(|s| s.id.as_str()).collect();
        let rows = self.fetch_metadata(client, &ids).await?;
        Ok(Self::apply_metadata(scraped, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::http_client::Timeouts;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING: &str = r#"
        <html><body><div class="min">
            <div class="section">
                <div class="user-avatar40"><a href="/u/1"><img src="http://img/1.png"></a></div>
                <div class="user-info-username"><a href="/u/1">哈哈</a></div>
                <div class="article"><pre>第一个笑话</pre></div>
                <div class="comment" id="comment-111"></div>
            </div>
            <div class="section">
                <div class="user-info-username"><a href="/u/2"></a></div>
                <div class="article"><pre>第二个笑话</pre></div>
                <div class="comment" id="comment-222"></div>
            </div>
        </div></body></html>
    "#;

    #[test]
    fn test_scrape_strips_comment_prefix() {
        let scraped = XiHa::new().unwrap().scrape(LISTING);
        assert_eq!(scraped.len(), 2);

        assert_eq!(scraped[0].id, "111");
        assert_eq!(scraped[0].post.content, "第一个笑话");
        assert_eq!(scraped[0].post.author.as_deref(), Some("哈哈"));
        assert_eq!(scraped[0].post.avatar.as_deref(), Some("http://img/1.png"));
        assert_eq!(scraped[0].post.source_site, "嘻嘻哈哈");

        assert_eq!(scraped[1].id, "222");
        assert!(scraped[1].post.author.is_none());
        assert!(scraped[1].post.avatar.is_none());
    }

    #[test]
    fn test_apply_metadata_in_id_order() {
        let scraped = XiHa::new().unwrap().scrape(LISTING);
        let rows = vec![
            vec![json!(5), json!(2), json!(1)],
            vec![json!("9"), json!(0), json!(3)],
        ];
        let posts = XiHa::apply_metadata(scraped, &rows);

        assert_eq!(
            (posts[0].comment_count, posts[0].like_count, posts[0].dislike_count),
            (5, 2, 1)
        );
        assert_eq!(
            (posts[1].comment_count, posts[1].like_count, posts[1].dislike_count),
            (9, 0, 3)
        );
        assert_eq!(posts[0].fetch_key, Some(FetchKey::new("111")));
        assert_eq!(posts[1].fetch_key, Some(FetchKey::new("222")));
    }

    #[test]
    fn test_missing_metadata_rows_leave_zero() {
        let scraped = XiHa::new().unwrap().scrape(LISTING);
        let posts = XiHa::apply_metadata(scraped, &[vec![json!(4), json!(4), json!(4)]]);
        assert_eq!(posts[0].like_count, 4);
        assert_eq!(
            (posts[1].comment_count, posts[1].like_count, posts[1].dislike_count),
            (0, 0, 0)
        );
    }

    #[tokio::test]
    async fn test_parse_requests_counters_for_scraped_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getcnums/"))
            .and(query_param("ids", "111,222"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"fn({"d":[[5,2,1],[9,0,3]]})"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let adapter = XiHa::new()
            .unwrap()
            .with_metadata_url(format!("{}/getcnums/?__jsonp__=fn&ids={{ids}}", server.uri()));
        let client = HttpClient::new(Timeouts::default()).unwrap();
        let posts = adapter
            .parse(&client, "http://xxhh", Payload::Html(LISTING.to_string()))
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].comment_count, 5);
        assert_eq!(posts[1].dislike_count, 3);
    }

    #[tokio::test]
    async fn test_empty_listing_skips_counter_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"fn({"d":[]})"#))
            .expect(0)
            .mount(&server)
            .await;

        let adapter = XiHa::new()
            .unwrap()
            .with_metadata_url(format!("{}/getcnums/?ids={{ids}}", server.uri()));
        let client = HttpClient::new(Timeouts::default()).unwrap();
        let posts = adapter
            .parse(&client, "http://xxhh", Payload::Html("<html></html>".to_string()))
            .await
            .unwrap();
        assert!(posts.is_empty());
    }
}
