//! 章节遍历器 (Chapter Walker)
//!
//! 从起始 URL 出发，沿下一章指针逐章解析，直到缺少 ID、解析失败、
//! 没有下一章、达到上限或回到已访问的文章。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use strum::Display;
use tracing::{debug, info, warn};

use crate::core::config::WalkerConfig;
use crate::core::event::{CrawlEvent, EventSender};
use crate::core::model::{ChapterSequence, StopReason};
use crate::interfaces::ArticleSource;

/// 单章状态，仅用于日志
#[derive(Debug, Clone, Copy, Display)]
enum ChapterPhase {
    Fetching,
    Extracted,
    Linked,
    Done,
}

const DEFAULT_CHAPTER_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    pub max_chapters: usize,
    /// 章节之间的礼貌延迟，显式设为 0 才会关闭
    #[builder(default = Duration::from_millis(DEFAULT_CHAPTER_DELAY_MS))]
    pub chapter_delay: Duration,
    #[builder(default = true)]
    pub stop_on_revisit: bool,
}

impl From<&WalkerConfig> for WalkOptions {
    fn from(cfg: &WalkerConfig) -> Self {
        Self {
            max_chapters: cfg.max_chapters,
            chapter_delay: cfg.chapter_delay(),
            stop_on_revisit: cfg.stop_on_revisit,
        }
    }
}

#[derive(Debug)]
pub struct WalkOutcome {
    pub chapters: ChapterSequence,
    pub stop: StopReason,
}

pub struct ChapterWalker {
    source: Arc<dyn ArticleSource>,
    options: WalkOptions,
    events: Option<EventSender>,
}

impl ChapterWalker {
    pub fn new(source: Arc<dyn ArticleSource>, options: WalkOptions) -> Self {
        Self {
            source,
            options,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn walk(&self, start_url: &str) -> WalkOutcome {
        let mut chapters = ChapterSequence::new();
        let mut visited = HashSet::new();
        let mut current = start_url.to_string();

        let stop = loop {
            if chapters.len() >= self.options.max_chapters {
                break StopReason::LimitReached;
            }
            let index = chapters.len() + 1;
            info!(index, url = %current, "正在爬取章节");
            self.trace(index, ChapterPhase::Fetching);
            if let Some(events) = &self.events {
                events.chapter_started(index, &current);
            }

            let Some(id) = self.source.article_id(&current) else {
                warn!(url = %current, "无法从 URL 中提取文章 ID");
                break StopReason::NoId;
            };
            if !visited.insert(id.clone()) && self.options.stop_on_revisit {
                warn!(id = %id, "下一章指向已访问的文章，停止遍历");
                break StopReason::Revisit;
            }

            let mut record = match self.source.resolve(&id).await {
                Ok(record) if record.is_resolved() => record,
                Ok(_) => {
                    warn!(id = %id, "章节没有可用内容");
                    break StopReason::NoContent;
                }
                Err(e) => {
                    warn!(id = %id, kind = e.kind(), "章节解析失败: {}", e);
                    break StopReason::NoContent;
                }
            };
            self.trace(index, ChapterPhase::Extracted);

            record.chapter_index = index;
            let next = record.next_chapter_ref.clone();
            if let Some(events) = &self.events {
                events.chapter_resolved(index, record.display_title());
            }
            info!(index, title = %record.display_title(), "章节已解析");
            chapters.push(record);

            match next {
                Some(_) if chapters.len() >= self.options.max_chapters => {
                    self.trace(index, ChapterPhase::Done);
                    break StopReason::LimitReached;
                }
                Some(next_url) => {
                    self.trace(index, ChapterPhase::Linked);
                    debug!(next = %next_url, "找到下一章链接");
                    current = next_url;
                    if !self.options.chapter_delay.is_zero() {
                        tokio::time::sleep(self.options.chapter_delay).await;
                    }
                }
                None => {
                    self.trace(index, ChapterPhase::Done);
                    break StopReason::NoNext;
                }
            }
        };

        info!(total = chapters.len(), reason = %stop, "章节遍历结束");
        if let Some(events) = &self.events {
            events.emit(CrawlEvent::WalkStopped {
                reason: stop,
                total: chapters.len(),
            });
        }
        WalkOutcome { chapters, stop }
    }

    fn trace(&self, index: usize, phase: ChapterPhase) {
        debug!(index, %phase, "章节状态");
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::core::error::{CrawlError, Result};
    use crate::core::model::ArticleRecord;

    /// 无限章节链：每章都指向 id + 1
    struct EndlessSource {
        cycle_at: Option<u64>,
    }

    #[async_trait]
    impl ArticleSource for EndlessSource {
        fn id(&self) -> &str {
            "endless"
        }

        fn article_id(&self, url: &str) -> Option<String> {
            url.strip_prefix("chain://").map(str::to_string)
        }

        async fn resolve(&self, article_id: &str) -> Result<ArticleRecord> {
            let n: u64 = article_id
                .parse()
                .map_err(|_| CrawlError::Parse(article_id.to_string()))?;
            let next = match self.cycle_at {
                Some(limit) if n >= limit => 1,
                _ => n + 1,
            };
            let mut record = ArticleRecord::new(article_id, format!("chain://{n}"));
            record.title = format!("第{n}章");
            record.next_chapter_ref = Some(format!("chain://{next}"));
            Ok(record)
        }
    }

    fn walker(cycle_at: Option<u64>, max: usize, stop_on_revisit: bool) -> ChapterWalker {
        let options = WalkOptions::builder()
            .max_chapters(max)
            .chapter_delay(Duration::ZERO)
            .stop_on_revisit(stop_on_revisit)
            .build();
        ChapterWalker::new(Arc::new(EndlessSource { cycle_at }), options)
    }

    #[tokio::test]
    async fn endless_chain_stops_at_ceiling() {
        for max in [1, 3, 7] {
            let outcome = walker(None, max, true).walk("chain://1").await;
            assert_eq!(outcome.chapters.len(), max);
            assert_eq!(outcome.stop, StopReason::LimitReached);
            let indices: Vec<usize> = outcome.chapters.iter().map(|c| c.chapter_index).collect();
            assert_eq!(indices, (1..=max).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn cycle_stops_with_revisit() {
        let outcome = walker(Some(3), 10, true).walk("chain://1").await;
        assert_eq!(outcome.chapters.len(), 3);
        assert_eq!(outcome.stop, StopReason::Revisit);

        let refetching = walker(Some(3), 5, false).walk("chain://1").await;
        assert_eq!(refetching.chapters.len(), 5);
        assert_eq!(refetching.stop, StopReason::LimitReached);
    }

    #[tokio::test]
    async fn unparsable_url_stops_with_no_id() {
        let outcome = walker(None, 5, true).walk("https://weibo.com/").await;
        assert!(outcome.chapters.is_empty());
        assert_eq!(outcome.stop, StopReason::NoId);
    }

    #[test]
    fn chapter_delay_defaults_to_three_seconds() {
        let options = WalkOptions::builder().max_chapters(2).build();
        assert_eq!(options.chapter_delay, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_between_linked_chapters() {
        let options = WalkOptions::builder().max_chapters(3).build();
        let walker = ChapterWalker::new(Arc::new(EndlessSource { cycle_at: None }), options);

        let started = tokio::time::Instant::now();
        let outcome = walker.walk("chain://1").await;

        assert_eq!(outcome.chapters.len(), 3);
        // 三章之间两次延迟，达到上限后不再等待
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(6), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(9), "{elapsed:?}");
    }

    #[tokio::test]
    async fn zero_ceiling_fetches_nothing() {
        let outcome = walker(None, 0, true).walk("chain://1").await;
        assert!(outcome.chapters.is_empty());
        assert_eq!(outcome.stop, StopReason::LimitReached);
    }
}
