//! 领域模型 (Domain Model)
//!
//! 文章记录、章节序列、补充文章列表以及一次抓取运行的汇总报告。

use serde::{Deserialize, Serialize};
use strum::Display;

/// 一个已解析的章节或独立文章
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// API 层面的文章 ID
    pub source_id: String,
    /// 产出该记录的请求 URL
    pub source_url: String,
    #[serde(default)]
    pub title: String,
    /// 正文，段落之间以空行分隔 (尚未规范化)
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// 源站原始格式，不做二次解析
    #[serde(default)]
    pub publish_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_chapter_ref: Option<String>,
    /// 由 Walker 分配的 1 起始序号，0 表示尚未入列
    #[serde(default)]
    pub chapter_index: usize,
}

impl ArticleRecord {
    pub fn new(source_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    /// 标题与正文均为空的记录代表提取失败，而非合法的空章节
    pub fn is_resolved(&self) -> bool {
        !self.title.trim().is_empty() || !self.body.trim().is_empty()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "无标题"
        } else {
            &self.title
        }
    }
}

/// 按发现顺序排列的章节序列
pub type ChapterSequence = Vec<ArticleRecord>;

/// 作者的其他文章 (补充列表)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// 产出该条目的发现接口标签 (如 `UID-1`, `Search-2`)
    pub source: String,
}

/// Walker 终止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    /// 当前 URL 中无法识别文章 ID
    NoId,
    /// 所有端点均未产出内容
    NoContent,
    /// 最后一章没有下一章指针
    NoNext,
    /// 达到章节数上限
    LimitReached,
    /// 下一章指针指向本次已访问过的文章
    Revisit,
}

/// 一次完整抓取的结构化记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub all_chapters: ChapterSequence,
    pub other_articles: Vec<RelatedArticle>,
    pub crawl_time: String,
    pub total_chapters: usize,
    pub total_other_articles: usize,
    pub stop_reason: StopReason,
}

impl CrawlReport {
    pub fn new(
        chapters: ChapterSequence,
        other_articles: Vec<RelatedArticle>,
        stop_reason: StopReason,
    ) -> Self {
        Self {
            total_chapters: chapters.len(),
            total_other_articles: other_articles.len(),
            all_chapters: chapters,
            other_articles,
            crawl_time: chrono::Local::now().to_rfc3339(),
            stop_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_not_resolved() {
        let mut record = ArticleRecord::new("1", "https://weibo.com/ttarticle/p/show?id=1");
        assert!(!record.is_resolved());

        record.body = "  \n ".into();
        assert!(!record.is_resolved());

        record.title = "第一章".into();
        assert!(record.is_resolved());
    }

    #[test]
    fn report_counts_match_lists() {
        let chapters = vec![ArticleRecord::new("a", "u"), ArticleRecord::new("b", "u")];
        let report = CrawlReport::new(chapters, Vec::new(), StopReason::NoNext);
        assert_eq!(report.total_chapters, 2);
        assert_eq!(report.total_other_articles, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stop_reason"], "no_next");
        assert_eq!(StopReason::LimitReached.to_string(), "limit_reached");
    }
}
