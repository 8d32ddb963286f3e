//! 抓取引擎调度器
//!
//! 负责一次抓取的生命周期：章节遍历 -> 作者文章发现 -> 导出

use std::sync::Arc;

use tracing::{error, info};

use crate::core::config::AppConfig;
use crate::core::error::CrawlError;
use crate::core::event::{CrawlEvent, EventSender};
use crate::core::export::{ExportPaths, Exporter};
use crate::core::model::CrawlReport;
use crate::interfaces::ArticleSource;

use super::walker::{ChapterWalker, WalkOptions};

/// 抓取引擎
pub struct CrawlEngine {
    source: Arc<dyn ArticleSource>,
    config: Arc<AppConfig>,
    exporter: Exporter,
    events: EventSender,
}

impl CrawlEngine {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        config: Arc<AppConfig>,
        exporter: Exporter,
        events: EventSender,
    ) -> Self {
        Self {
            source,
            config,
            exporter,
            events,
        }
    }

    /// 执行抓取流程
    pub async fn run(&self, start_url: &str) -> anyhow::Result<(CrawlReport, ExportPaths)> {
        self.events.emit(CrawlEvent::CrawlStarted {
            url: start_url.to_string(),
        });
        info!(site = self.source.id(), url = %start_url, "开始爬取");

        // 1. 章节遍历 (Walk)
        let walker = ChapterWalker::new(self.source.clone(), WalkOptions::from(&self.config.walker))
            .with_events(self.events.clone());
        let outcome = walker.walk(start_url).await;

        let Some(lead) = outcome.chapters.first() else {
            let err = CrawlError::NoChapters(outcome.stop.to_string());
            error!("未能获取任何章节: {}", err);
            self.events.emit(CrawlEvent::CrawlFailed {
                error: err.to_string(),
            });
            return Err(err.into());
        };

        // 2. 作者其他文章 (Discover)
        let related = self.source.related_articles(lead).await;
        self.events.emit(CrawlEvent::RelatedArticlesFound {
            count: related.len(),
        });

        // 3. 导出 (Export)
        let report = CrawlReport::new(outcome.chapters, related, outcome.stop);
        let paths = match self.exporter.write(&report).await {
            Ok(paths) => paths,
            Err(e) => {
                self.events.emit(CrawlEvent::CrawlFailed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };
        self.events.emit(CrawlEvent::ExportWritten {
            json: paths.json.display().to_string(),
            markdown: paths.markdown.display().to_string(),
        });

        info!(
            chapters = report.total_chapters,
            other_articles = report.total_other_articles,
            stop = %report.stop_reason,
            "爬取完成"
        );
        Ok((report, paths))
    }
}
