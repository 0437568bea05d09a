//! One crawl cycle: sources in order, store, forward, then comments.
//!
//! Every await is sequential. A failing source is logged and skipped; a
//! failing comment fetch only affects its own post.

use std::collections::HashMap;

use tracing::{error, info, warn};

use crate::config::{Config, SourceEntry};
use crate::error::ScrapeError;
use crate::ingest::IngestClient;
use crate::models::{FetchKey, Post};
use crate::repository::util::redact_url_password;
use crate::repository::DieselDbContext;
use crate::scrapers::{CommentAdapter, HttpClient};

/// Outcome of crawling one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub key: String,
    /// Posts returned by the adapter.
    pub scraped: usize,
    /// Posts newly written to the store.
    pub stored: usize,
    /// Posts already present in the store.
    pub duplicates: usize,
    pub comments_stored: usize,
    pub forwarded: usize,
    /// Set when the adapter failed and the source was skipped.
    pub error: Option<String>,
}

impl SourceReport {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sources: Vec<SourceReport>,
}

impl CycleReport {
    pub fn stored(&self) -> usize {
        self.sources.iter().map(|s| s.stored).sum()
    }

    pub fn failed(&self) -> usize {
        self.sources.iter().filter(|s| !s.is_ok()).count()
    }
}

pub struct Pipeline {
    client: HttpClient,
    db: DieselDbContext,
    ingest: Option<IngestClient>,
    comments: HashMap<String, Box<dyn CommentAdapter>>,
}

impl Pipeline {
    pub fn new(
        client: HttpClient,
        db: DieselDbContext,
        ingest: Option<IngestClient>,
        comments: HashMap<String, Box<dyn CommentAdapter>>,
    ) -> Self {
        Self {
            client,
            db,
            ingest,
            comments,
        }
    }

    /// Build the HTTP client, store and forwarder described by a config.
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let client = HttpClient::with_user_agent(config.timeouts(), config.user_agent.as_deref())?;
        let db = DieselDbContext::new(&config.database);
        let ingest = match &config.ingest_url {
            Some(url) => {
                info!("forwarding new records to {}", redact_url_password(url));
                Some(IngestClient::new(url, config.source_ids.clone())?)
            }
            None => {
                info!("no ingest URL configured, forwarding disabled");
                None
            }
        };
        let comments = config
            .comments
            .iter()
            .map(|(key, kind)| (key.clone(), kind.build()))
            .collect();
        Ok(Self::new(client, db, ingest, comments))
    }

    pub fn db(&self) -> &DieselDbContext {
        &self.db
    }

    /// Crawl each source in order. Never fails as a whole.
    pub async fn run(&self, sources: &[&SourceEntry]) -> CycleReport {
        let mut report = CycleReport::default();
        for (num, entry) in sources.iter().enumerate() {
            info!("task {}: start crawl {}", num, entry.key);
            let source_report = self.run_source(entry).await;
            info!(
                "end crawl {}: {} stored, {} duplicates",
                entry.key, source_report.stored, source_report.duplicates
            );
            report.sources.push(source_report);
        }
        report
    }

    pub async fn run_source(&self, entry: &SourceEntry) -> SourceReport {
        let mut report = SourceReport::new(&entry.key);
        if let Err(e) = self.crawl_source(entry, &mut report).await {
            error!("{} failed ({}): {}", entry.key, e.kind(), e);
            report.error = Some(e.to_string());
        }
        report
    }

    async fn crawl_source(
        &self,
        entry: &SourceEntry,
        report: &mut SourceReport,
    ) -> Result<(), ScrapeError> {
        let adapter = entry.adapter.build()?;
        let posts = adapter.run(&self.client, &entry.url).await?;
        report.scraped = posts.len();

        let comment_adapter = self.comments.get(&entry.key);

        for post in posts {
            let Some(post_id) = self.store_post(&post, report).await else {
                continue;
            };
            self.forward_post(post_id, report).await;

            if let (Some(adapter), Some(key)) = (&comment_adapter, &post.fetch_key) {
                self.crawl_comments(adapter.as_ref(), post_id, key, report)
                    .await;
            }
        }
        Ok(())
    }

    /// Store a post, returning its id only when it is new.
    async fn store_post(&self, post: &Post, report: &mut SourceReport) -> Option<i32> {
        match self.db.posts().insert(post).await {
            Ok(Some(id)) => {
                report.stored += 1;
                Some(id)
            }
            Ok(None) => {
                report.duplicates += 1;
                None
            }
            Err(e) => {
                let e = ScrapeError::from(e);
                error!("failed to store post ({}): {}", e.kind(), e);
                None
            }
        }
    }

    async fn forward_post(&self, post_id: i32, report: &mut SourceReport) {
        let Some(ingest) = &self.ingest else {
            return;
        };
        let stored = match self.db.posts().get(post_id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                warn!("post {} vanished before forwarding", post_id);
                return;
            }
            Err(e) => {
                error!("failed to load post {}: {}", post_id, e);
                return;
            }
        };
        match ingest.forward_post(&stored).await {
            Ok(true) => report.forwarded += 1,
            Ok(false) => {}
            Err(e) => error!("failed to forward post {} ({}): {}", post_id, e.kind(), e),
        }
    }

    async fn crawl_comments(
        &self,
        adapter: &dyn CommentAdapter,
        post_id: i32,
        key: &FetchKey,
        report: &mut SourceReport,
    ) {
        let comments = match adapter.run(&self.client, post_id, key).await {
            Ok(comments) => comments,
            Err(e) => {
                error!(
                    "{} failed for post {} ({}): {}",
                    adapter.name(),
                    post_id,
                    e.kind(),
                    e
                );
                return;
            }
        };

        let repo = self.db.comments();
        for comment in comments {
            let id = match repo.insert(&comment).await {
                Ok(Some(id)) => id,
                Ok(None) => continue,
                Err(e) => {
                    error!("failed to store comment for post {}: {}", post_id, e);
                    continue;
                }
            };
            report.comments_stored += 1;

            let Some(ingest) = &self.ingest else {
                continue;
            };
            match repo.get(id).await {
                Ok(Some(stored)) => {
                    if let Err(e) = ingest.forward_comment(&stored).await {
                        error!("failed to forward comment {} ({}): {}", id, e.kind(), e);
                    }
                }
                Ok(None) => warn!("comment {} vanished before forwarding", id),
                Err(e) => error!("failed to load comment {}: {}", id, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::comments::PengFuComments;
    use crate::scrapers::http_client::Timeouts;
    use crate::scrapers::PostSourceKind;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PENGFU_PAGE: &str = r#"
        <div class="list-item" id="1001">
            <p class="user_name_list"><a>捧友</a></p>
            <div class="content-img">一个笑话</div>
            <span class="ding"><em>3</em></span>
        </div>
        <div class="list-item" id="1002">
            <p class="user_name_list"><a>捧友</a></p>
            <div class="content-img">一个笑话</div>
        </div>
    "#;

    const PENGFU_PAIR: &str = r#"
        <div class="list-item" id="2001">
            <p class="user_name_list"><a>捧友</a></p>
            <div class="content-img">第一个笑话</div>
        </div>
        <div class="list-item" id="2002">
            <p class="user_name_list"><a>捧友</a></p>
            <div class="content-img">第二个笑话</div>
        </div>
    "#;

    async fn pipeline_with_comments(
        dir: &tempfile::TempDir,
        ingest: Option<IngestClient>,
        comments: HashMap<String, Box<dyn CommentAdapter>>,
    ) -> Pipeline {
        let db = DieselDbContext::new(&dir.path().join("test.db"));
        db.init_schema().await.unwrap();
        let client = HttpClient::new(Timeouts::default()).unwrap();
        Pipeline::new(client, db, ingest, comments)
    }

    async fn pipeline(dir: &tempfile::TempDir, ingest: Option<IngestClient>) -> Pipeline {
        pipeline_with_comments(dir, ingest, HashMap::new()).await
    }

    #[tokio::test]
    async fn test_duplicate_content_is_stored_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PENGFU_PAGE, "text/html"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        // No comment adapter for this key, so no comment requests
        let entry = SourceEntry::new(
            "pengfu-mirror",
            &format!("{}/list", server.uri()),
            PostSourceKind::PengFu,
        );
        let pipeline = pipeline(&dir, None).await;
        let report = pipeline.run(&[&entry]).await;

        let source = &report.sources[0];
        assert!(source.is_ok());
        assert_eq!((source.scraped, source.stored, source.duplicates), (2, 1, 1));
        assert_eq!(pipeline.db().posts().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failing_source_does_not_stop_cycle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PENGFU_PAGE, "text/html"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let broken = SourceEntry::new(
            "broken",
            &format!("{}/broken", server.uri()),
            PostSourceKind::NetEase,
        );
        let healthy = SourceEntry::new(
            "healthy",
            &format!("{}/list", server.uri()),
            PostSourceKind::PengFu,
        );
        let report = pipeline(&dir, None).await.run(&[&broken, &healthy]).await;

        assert_eq!(report.failed(), 1);
        assert!(report.sources[0].error.as_deref().unwrap().contains("503"));
        assert_eq!(report.sources[1].stored, 1);
        assert_eq!(report.stored(), 1);
    }

    #[tokio::test]
    async fn test_new_posts_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PENGFU_PAGE, "text/html"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/store/joke"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ingest = IngestClient::new(
            &server.uri(),
            HashMap::from([("捧腹网".to_string(), 5266)]),
        )
        .unwrap();
        let entry = SourceEntry::new(
            "other",
            &format!("{}/list", server.uri()),
            PostSourceKind::PengFu,
        );
        let report = pipeline(&dir, Some(ingest)).await.run(&[&entry]).await;
        assert_eq!(report.sources[0].forwarded, 1);
    }

    #[tokio::test]
    async fn test_comments_stored_and_forwarded_per_post() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PENGFU_PAIR, "text/html"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/getComments"))
            .and(query_param("id", "2001"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/getComments"))
            .and(query_param("id", "2002"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"name": "甲", "content_json": [{"comment_content": "哈哈"}], "like": 3},
                    {"name": "乙", "content_json": [{"comment_content": "笑死"}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/store/joke"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/store/comment"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ingest = IngestClient::new(
            &server.uri(),
            HashMap::from([("捧腹网".to_string(), 5266)]),
        )
        .unwrap();
        let comments: HashMap<String, Box<dyn CommentAdapter>> = HashMap::from([(
            "pengfu".to_string(),
            Box::new(PengFuComments::with_url(format!(
                "{}/getComments?id={{id}}",
                server.uri()
            ))) as Box<dyn CommentAdapter>,
        )]);
        let entry = SourceEntry::new(
            "pengfu",
            &format!("{}/list", server.uri()),
            PostSourceKind::PengFu,
        );
        let pipeline = pipeline_with_comments(&dir, Some(ingest), comments).await;
        let report = pipeline.run(&[&entry]).await;

        // The failed comment fetch for the first post leaves the second alone
        let source = &report.sources[0];
        assert!(source.is_ok());
        assert_eq!((source.stored, source.forwarded), (2, 2));
        assert_eq!(source.comments_stored, 2);

        let stored = pipeline.db().comments().get(1).await.unwrap().unwrap();
        assert_eq!(stored.comment.post_id, 2);
        assert_eq!(stored.comment.content, "哈哈");
        assert_eq!(stored.comment.like_count, 3);
    }
}
