//! 终端进度渲染 (Terminal Progress)
//!
//! 基于 `indicatif` 的单个 spinner，只消费事件，不持有任何抓取状态。

use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use crate::core::event::{CrawlEvent, EventReceiver};

/// 全局 TUI 容器
static MULTI: OnceLock<MultiProgress> = OnceLock::new();

/// 获取全局进度容器实例，日志写入器也通过它输出
pub fn get_multi() -> &'static MultiProgress {
    MULTI.get_or_init(MultiProgress::new)
}

/// 进度协调器
pub struct Ui;

impl Ui {
    /// 启动事件监听循环，发送端全部关闭后退出
    pub fn run(receiver: EventReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut bar: Option<ProgressBar> = None;
            while let Some(event) = receiver.recv_async().await {
                Self::handle_event(&mut bar, event);
            }
            if let Some(bar) = bar.filter(|b| !b.is_finished()) {
                bar.finish_and_clear();
            }
        })
    }

    fn handle_event(bar: &mut Option<ProgressBar>, event: CrawlEvent) {
        match event {
            CrawlEvent::CrawlStarted { url } => {
                let style = ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

                let spinner = get_multi().add(ProgressBar::new_spinner());
                spinner.set_style(style);
                spinner.set_message(format!("📰 {}", truncate_string(&url, 60)));
                spinner.enable_steady_tick(Duration::from_millis(100));
                *bar = Some(spinner);
            }
            CrawlEvent::ChapterStarted { index, .. } => {
                if let Some(b) = bar {
                    b.set_message(format!("第 {index} 章 获取中..."));
                }
            }
            CrawlEvent::ChapterResolved { index, title } => {
                if let Some(b) = bar {
                    b.set_message(format!("第 {index} 章 {}", truncate_string(&title, 30)));
                }
            }
            CrawlEvent::WalkStopped { reason, total } => {
                if let Some(b) = bar {
                    b.set_message(format!("共 {total} 章 (停止: {reason})"));
                }
            }
            CrawlEvent::RelatedArticlesFound { count } => {
                if let Some(b) = bar {
                    b.set_message(format!("作者其他文章 {count} 篇"));
                }
            }
            CrawlEvent::ExportWritten { markdown, .. } => {
                if let Some(b) = bar {
                    b.finish_with_message(format!("✅ 已保存 {markdown}"));
                }
            }
            CrawlEvent::CrawlFailed { error } => {
                if let Some(b) = bar {
                    b.abandon_with_message(format!("❌ FAILED: {error}"));
                }
            }
        }
    }
}

/// 按字符数截断并追加省略号
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_titles() {
        assert_eq!(truncate_string("短标题", 30), "短标题");
        assert_eq!(truncate_string("abcdefghij", 6), "abc...");
    }
}
