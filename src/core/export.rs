//! 结果导出 (Export)
//!
//! 将一次抓取的报告写成 JSON 与 Markdown 两份文件，共用同一时间戳文件名。

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::core::model::{ArticleRecord, CrawlReport, RelatedArticle};
use crate::text::Normalizer;
use crate::utils::{save_file, truncate_chars};

const FILE_PREFIX: &str = "ttarticle_chapters";
const SUMMARY_PREVIEW_CHARS: usize = 200;

/// 导出产物路径
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n+").unwrap())
}

pub struct Exporter {
    dir: PathBuf,
    normalizer: Normalizer,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, normalizer: Normalizer) -> Self {
        Self {
            dir: dir.into(),
            normalizer,
        }
    }

    pub async fn write(&self, report: &CrawlReport) -> Result<ExportPaths> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let json = self.dir.join(format!("{FILE_PREFIX}_{stamp}.json"));
        let markdown = self.dir.join(format!("{FILE_PREFIX}_{stamp}.md"));

        let payload = serde_json::to_vec_pretty(report).context("Failed to serialize crawl report")?;
        write_artifact(&json, &payload).await?;
        info!(path = %json.display(), "结果已保存");

        let text = self.render_markdown(report);
        write_artifact(&markdown, text.as_bytes()).await?;
        info!(path = %markdown.display(), "Markdown 结果已保存");

        Ok(ExportPaths { json, markdown })
    }

    /// 每个标题、正文、摘要单独规范化后再拼接
    pub fn render_markdown(&self, report: &CrawlReport) -> String {
        let mut out = String::new();
        for chapter in &report.all_chapters {
            self.push_chapter(&mut out, chapter);
        }
        for article in &report.other_articles {
            self.push_related(&mut out, article);
        }
        out
    }

    fn push_chapter(&self, out: &mut String, chapter: &ArticleRecord) {
        let title = or_default(&chapter.title, "未知");
        let body = or_default(&chapter.body, "无内容");

        let body = self.normalizer.normalize(body);
        let body = paragraphize(&blank_lines().replace_all(&body, "\n\n"));

        out.push_str(&format!("## {}\n\n", self.normalizer.normalize(title)));
        out.push_str(&format!("{body}\n\n"));
    }

    fn push_related(&self, out: &mut String, article: &RelatedArticle) {
        let title = or_default(&article.title, "未知");
        let url = or_default(&article.url, "无链接");
        let summary = article
            .summary
            .as_deref()
            .map(|s| or_default(s, "无内容"))
            .unwrap_or("无内容");

        let summary = self.normalizer.normalize(summary);
        let preview = format!("{}...", truncate_chars(&summary, SUMMARY_PREVIEW_CHARS));
        let preview = blank_lines().replace_all(&preview, "\n");

        out.push_str(&format!("## {}\n", self.normalizer.normalize(title)));
        out.push_str(&format!("{url}\n"));
        out.push_str(&format!("{preview}\n\n"));
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// 孤立的单个换行扩展为空行
fn paragraphize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for (i, &ch) in chars.iter().enumerate() {
        let prev_nl = i > 0 && chars[i - 1] == '\n';
        let next_nl = chars.get(i + 1) == Some(&'\n');
        if ch == '\n' && !prev_nl && !next_nl {
            out.push_str("\n\n");
        } else {
            out.push(ch);
        }
    }
    out
}

async fn write_artifact(path: &Path, data: &[u8]) -> Result<()> {
    save_file(path, data)
        .await
        .with_context(|| format!("Failed to write artifact: {:?}", path))
}
