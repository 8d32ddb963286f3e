use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use serde_json::json;

use ttarticle::core::config::{AppConfig, CrawlerConfig, OutputConfig, WalkerConfig};
use ttarticle::core::error::{CrawlError, Result};
use ttarticle::core::event::{CrawlEvent, create_event_channel};
use ttarticle::core::export::Exporter;
use ttarticle::core::model::StopReason;
use ttarticle::engine::{ChapterWalker, CrawlEngine, WalkOptions};
use ttarticle::interfaces::{FetchResponse, HttpFetch};
use ttarticle::sites::Weibo;
use ttarticle::text::Normalizer;

/// 按 URL 返回预设响应的内存 HTTP 实现
#[derive(Default)]
struct CannedFetch {
    routes: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl CannedFetch {
    fn detail(mut self, id: &str, title: &str, next: Option<&str>) -> Self {
        let mut data = json!({
            "title": title,
            "author": "连载作者",
            "content": format!("<p>{title}的正文</p>"),
        });
        if let Some(next) = next {
            data["sibling"] = json!({ "next": { "url": format!("https://weibo.com/ttarticle/p/show?id={next}") } });
        }
        let body = json!({ "code": "100000", "data": data }).to_string();
        self.routes
            .insert(format!("https://weibo.com/ttarticle/x/m/aj/detail?id={id}"), body);
        self
    }
}

#[async_trait]
impl HttpFetch for CannedFetch {
    async fn get(&self, url: &str, _headers: &HeaderMap, _timeout: Duration) -> Result<FetchResponse> {
        self.calls.lock().push(url.to_string());
        self.routes
            .get(url)
            .map(|body| FetchResponse::new(200, HeaderMap::new(), body.clone()))
            .ok_or_else(|| CrawlError::Transport(format!("no route for {url}")))
    }
}

fn config(dir: &std::path::Path) -> AppConfig {
    AppConfig::builder()
        .crawler(
            CrawlerConfig::builder()
                .debug(false)
                .fetch_author_articles(false)
                .endpoint_delay_ms(0)
                .build(),
        )
        .walker(
            WalkerConfig::builder()
                .max_chapters(10)
                .chapter_delay_ms(0)
                .stop_on_revisit(true)
                .build(),
        )
        .output(OutputConfig::builder().dir(dir.display().to_string()).build())
        .build()
}

fn chain() -> CannedFetch {
    CannedFetch::default()
        .detail("100", "第一章", Some("200"))
        .detail("200", "第二章", Some("300"))
        .detail("300", "第三章", None)
}

#[tokio::test]
async fn walks_three_linked_chapters_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(config(dir.path()));
    let fetch = Arc::new(chain());
    let site = Arc::new(Weibo::new(fetch.clone(), config.clone()));

    let (events, receiver) = create_event_channel();
    let exporter = Exporter::new(dir.path(), Normalizer::default());
    let engine = CrawlEngine::new(site, config, exporter, events);

    let (report, paths) = engine
        .run("https://weibo.com/ttarticle/p/show?id=100")
        .await
        .unwrap();

    assert_eq!(report.total_chapters, 3);
    assert_eq!(report.stop_reason, StopReason::NoNext);
    let titles: Vec<&str> = report.all_chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["第一章", "第二章", "第三章"]);
    assert_eq!(report.all_chapters[2].chapter_index, 3);
    assert!(report.other_articles.is_empty());

    // 每章都由第一个端点解析成功
    assert_eq!(fetch.calls.lock().len(), 3);

    let markdown = std::fs::read_to_string(&paths.markdown).unwrap();
    assert!(markdown.starts_with("## 第一章\n\n第一章的正文\n\n"));
    assert!(markdown.contains("## 第三章"));

    let mut saw_stop = false;
    while let Some(event) = receiver.try_recv() {
        if let CrawlEvent::WalkStopped { reason, total } = event {
            assert_eq!((reason, total), (StopReason::NoNext, 3));
            saw_stop = true;
        }
    }
    assert!(saw_stop);
}

#[tokio::test]
async fn ceiling_truncates_the_chain() {
    let site = Arc::new(Weibo::new(Arc::new(chain()), Arc::new(AppConfig::default())));
    let options = WalkOptions::builder()
        .max_chapters(2)
        .chapter_delay(Duration::ZERO)
        .build();

    let outcome = ChapterWalker::new(site, options)
        .walk("https://weibo.com/ttarticle/p/show?id=100")
        .await;

    assert_eq!(outcome.chapters.len(), 2);
    assert_eq!(outcome.stop, StopReason::LimitReached);
}

#[tokio::test]
async fn missing_id_yields_no_chapters_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(config(dir.path()));
    let site = Arc::new(Weibo::new(Arc::new(chain()), config.clone()));
    let (events, _receiver) = create_event_channel();
    let engine = CrawlEngine::new(site, config, Exporter::new(dir.path(), Normalizer::default()), events);

    let err = engine.run("https://weibo.com/ttarticle/p/show").await.unwrap_err();
    let crawl_err = err.downcast_ref::<CrawlError>().unwrap();
    assert!(matches!(crawl_err, CrawlError::NoChapters(reason) if reason == "no_id"));
}
