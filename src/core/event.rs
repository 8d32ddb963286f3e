//! 事件系统定义
//!
//! 用于 Engine 与 UI 之间的完全解耦通信

use flume::{Receiver, Sender};

use crate::core::model::StopReason;

/// 抓取事件类型
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// 任务开始
    CrawlStarted { url: String },

    /// 开始解析某一章
    ChapterStarted { index: usize, url: String },

    /// 章节解析完成并已入列
    ChapterResolved { index: usize, title: String },

    /// 章节遍历结束
    WalkStopped { reason: StopReason, total: usize },

    /// 作者其他文章发现完成
    RelatedArticlesFound { count: usize },

    /// 导出完成
    ExportWritten { json: String, markdown: String },

    /// 任务失败
    CrawlFailed { error: String },
}

/// 事件发送器
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<CrawlEvent>,
}

impl EventSender {
    pub fn new(tx: Sender<CrawlEvent>) -> Self {
        Self { tx }
    }

    /// 发送事件
    pub fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }

    pub fn chapter_started(&self, index: usize, url: &str) {
        self.emit(CrawlEvent::ChapterStarted {
            index,
            url: url.to_string(),
        });
    }

    pub fn chapter_resolved(&self, index: usize, title: &str) {
        self.emit(CrawlEvent::ChapterResolved {
            index,
            title: title.to_string(),
        });
    }
}

/// 事件接收器
pub struct EventReceiver {
    rx: Receiver<CrawlEvent>,
}

impl EventReceiver {
    pub fn new(rx: Receiver<CrawlEvent>) -> Self {
        Self { rx }
    }

    /// 非阻塞接收事件
    pub fn try_recv(&self) -> Option<CrawlEvent> {
        self.rx.try_recv().ok()
    }

    /// 异步接收事件
    pub async fn recv_async(&self) -> Option<CrawlEvent> {
        self.rx.recv_async().await.ok()
    }
}

/// 创建事件通道
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = flume::unbounded();
    (EventSender::new(tx), EventReceiver::new(rx))
}
