//! End-to-end crawl cycle against mock upstream and ingestion servers.

use std::time::Duration;

use jokecrawl::config::{Config, SourceEntry};
use jokecrawl::pipeline::Pipeline;
use jokecrawl::scrapers::PostSourceKind;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WADUANZI_PAGE: &str = r#"
    <html><body>
    <div class="post-item">
        <div class="post-author"><img src="http://img/1.png"><a>挖友甲</a></div>
        <h2 class="item-title"><a>第一条</a></h2>
        <div class="item-content">挖到的第一个段子</div>
        <div class="item-toolbar"><ul><li><a>10</a></li><li><a>-2</a></li></ul></div>
    </div>
    <div class="post-item">
        <div class="post-author"><img src="http://img/2.png"><a>挖友乙</a></div>
        <h2 class="item-title"><a>第二条</a></h2>
        <div class="item-content">挖到的第二个段子</div>
        <div class="item-toolbar"><ul><li><a>4</a></li><li><a>0</a></li></ul></div>
    </div>
    </body></html>
"#;

fn config(dir: &tempfile::TempDir, upstream: &MockServer, ingest: &MockServer) -> Config {
    Config {
        database: dir.path().join("jokes.db"),
        ingest_url: Some(ingest.uri()),
        connect_timeout_secs: 2,
        read_timeout_secs: 1,
        sources: vec![
            SourceEntry::new(
                "netease",
                &format!("{}/netease", upstream.uri()),
                PostSourceKind::NetEase,
            ),
            SourceEntry::new(
                "waduanzi",
                &format!("{}/waduanzi", upstream.uri()),
                PostSourceKind::WaDuanZi,
            ),
        ],
        ..Config::default()
    }
}

#[tokio::test]
async fn slow_source_does_not_block_the_rest_of_the_cycle() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/netease"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"段子": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/waduanzi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(WADUANZI_PAGE, "text/html; charset=utf-8"),
        )
        .mount(&upstream)
        .await;

    let ingest = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/store/joke"))
        .and(body_partial_json(json!({"source_id": 5267, "online": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&ingest)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir, &upstream, &ingest);
    let pipeline = Pipeline::from_config(&config).unwrap();
    pipeline.db().init_schema().await.unwrap();

    let sources = config.selected_sources(&[]).unwrap();
    let report = pipeline.run(&sources).await;

    assert_eq!(report.sources.len(), 2);
    assert!(report.sources[0].error.is_some());
    assert_eq!(report.sources[0].stored, 0);

    let waduanzi = &report.sources[1];
    assert!(waduanzi.is_ok());
    assert_eq!((waduanzi.scraped, waduanzi.stored, waduanzi.forwarded), (2, 2, 2));

    let posts = pipeline.db().posts();
    assert_eq!(posts.count_by_site("挖段子").await.unwrap(), 2);
    let first = posts.get(1).await.unwrap().unwrap();
    assert_eq!(first.post.author.as_deref(), Some("挖友甲"));
    assert_eq!(first.post.dislike_count, 2);
}

#[tokio::test]
async fn second_cycle_stores_and_forwards_nothing_new() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/waduanzi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(WADUANZI_PAGE, "text/html; charset=utf-8"),
        )
        .mount(&upstream)
        .await;

    let ingest = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/store/joke"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&ingest)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir, &upstream, &ingest);
    let pipeline = Pipeline::from_config(&config).unwrap();
    pipeline.db().init_schema().await.unwrap();

    let sources = config.selected_sources(&["waduanzi".to_string()]).unwrap();
    let first = pipeline.run(&sources).await;
    let second = pipeline.run(&sources).await;

    assert_eq!(first.stored(), 2);
    assert_eq!(second.stored(), 0);
    assert_eq!(second.sources[0].duplicates, 2);
    assert_eq!(second.sources[0].forwarded, 0);
}
