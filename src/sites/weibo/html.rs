//! HTML 页面提取
//!
//! 标题、作者、时间、正文均按选择器优先级取第一个非空结果；
//! 结构化提取失败时再退回到源码级正则。

use scraper::{ElementRef, Html, Node};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::decode::{strip_markup, unescape_lossy};
use super::selectors::{SitePatterns, SiteSelectors};
use crate::core::error::{CrawlError, Result};
use crate::core::model::ArticleRecord;
use crate::text::add_spacing;
use crate::utils::to_absolute_url;

const ARTICLE_BASE: &str = "https://weibo.com/ttarticle/p/";
const MIN_BODY_CHARS: usize = 50;
const MAX_AUTHOR_CHARS: usize = 50;
const NEXT_KEYWORDS: [&str; 3] = ["下一篇", "下一章", "下一页"];

/// 逐个文本节点去除首尾空白后拼接
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

pub fn extract_html(text: &str, id: &str, url: &str) -> Result<ArticleRecord> {
    let doc = Html::parse_document(text);
    let s = SiteSelectors::get();
    let p = SitePatterns::get();
    let mut record = ArticleRecord::new(id, url);

    if let Some(title) = s
        .title
        .iter()
        .filter_map(|sel| doc.select(sel).next())
        .map(stripped_text)
        .find(|t| !t.is_empty())
    {
        // 去掉站点名后缀
        record.title = match title.split_once("微博") {
            Some((head, _)) => head.trim().to_string(),
            None => title,
        };
    }

    extract_author(&doc, &mut record);

    record.publish_time = s
        .time
        .iter()
        .filter_map(|sel| doc.select(sel).next())
        .map(stripped_text)
        .find(|t| !t.is_empty())
        .unwrap_or_default();

    for sel in &s.content {
        if let Some(el) = doc.select(sel).next() {
            let body = formatted_text(el);
            if body.chars().count() > MIN_BODY_CHARS {
                record.body = body;
                break;
            }
        }
    }

    record.next_chapter_ref = find_next_link(&doc);

    if record.author_id.is_none()
        && let Some((name, uid)) = p
            .uid
            .iter()
            .find_map(|(name, re)| re.captures(text).map(|c| (*name, c[1].to_string())))
    {
        debug!(pattern = name, uid = %uid, "从页面源码提取到作者 UID");
        record.author_id = Some(uid);
    }

    if record.author_name.is_none()
        && let Some((name, author)) = p
            .author
            .iter()
            .find_map(|(name, re)| re.captures(text).map(|c| (*name, unescape_lossy(&c[1]))))
    {
        debug!(pattern = name, author = %author, "从页面源码提取到作者");
        record.author_name = Some(author);
    }

    if let Some(long_text) = embedded_long_text(&doc) {
        record.body = long_text;
    }

    if !record.is_resolved() {
        return Err(CrawlError::ExtractionFailed(format!(
            "no title or body in html ({url})"
        )));
    }
    Ok(record)
}

fn extract_author(doc: &Html, record: &mut ArticleRecord) {
    let s = SiteSelectors::get();
    let p = SitePatterns::get();

    for sel in &s.author {
        let Some(el) = doc.select(sel).next() else {
            continue;
        };
        let raw = stripped_text(el);
        if raw.is_empty() {
            continue;
        }
        let first_line = raw.lines().next().unwrap_or_default().trim();
        let name = p.whitespace.replace_all(first_line, " ").into_owned();
        let len = name.chars().count();
        if len == 0 || len >= MAX_AUTHOR_CHARS {
            continue;
        }

        let link = if el.value().name() == "a" {
            Some(el)
        } else {
            el.select(&s.any_link).next()
        };
        record.author_id = link
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| p.uid_in_href.captures(href))
            .map(|c| c[1].to_string());

        record.author_name = Some(name);
        return;
    }

    record.author_name = doc
        .select(&s.data_author)
        .filter_map(|el| el.value().attr("data-author"))
        .find(|a| !a.is_empty())
        .map(str::to_string);
}

/// 保留段落结构的文本提取
///
/// `<br>` 转换为换行，`<p>` 之后追加空行，`<div>` 之后追加换行，
/// 然后将三个以上的连续换行压缩为两个并添加中英文间距。
fn formatted_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_formatted(el, &mut raw);

    let collapsed = SitePatterns::get().excess_newlines.replace_all(&raw, "\n\n");
    add_spacing(&collapsed).trim().to_string()
}

fn push_formatted(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(e) => match e.name() {
                "br" => out.push('\n'),
                "script" | "style" => {}
                name => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        push_formatted(child_el, out);
                    }
                    match name {
                        "p" => out.push_str("\n\n"),
                        "div" => out.push('\n'),
                        _ => {}
                    }
                }
            },
            _ => {}
        }
    }
}

fn find_next_link(doc: &Html) -> Option<String> {
    let s = SiteSelectors::get();
    let base = Url::parse(ARTICLE_BASE).ok()?;

    for rule in &s.next_links {
        let hit = doc.select(&rule.selector).find(|a| match rule.text {
            Some(keyword) => a.text().collect::<String>().contains(keyword),
            None => true,
        });
        if let Some(href) = hit.and_then(|a| a.value().attr("href")).filter(|h| !h.is_empty()) {
            return Some(to_absolute_url(&base, href));
        }
    }

    // 全文扫描锚文本，只接受绝对链接或站内根路径
    doc.select(&s.any_link).find_map(|a| {
        let label = stripped_text(a);
        let href = a.value().attr("href")?;
        let is_next = NEXT_KEYWORDS.iter().any(|k| label.contains(k));
        let is_article = href.contains("ttarticle") || href.contains("show?id=");
        if !(is_next && is_article) {
            return None;
        }
        if href.starts_with("http") {
            Some(href.to_string())
        } else if href.starts_with('/') {
            Some(format!("https://weibo.com{href}"))
        } else {
            None
        }
    })
}

/// 内嵌 `<script>` 中携带 `longTextContent` 的 JSON 对象，后出现的覆盖先出现的
fn embedded_long_text(doc: &Html) -> Option<String> {
    let s = SiteSelectors::get();
    let p = SitePatterns::get();

    doc.select(&s.script)
        .filter_map(|script| {
            let source: String = script.text().collect();
            if !source.contains("longTextContent") {
                return None;
            }
            p.long_text_object.find_iter(&source).find_map(|m| {
                let value: Value = serde_json::from_str(m.as_str()).ok()?;
                value
                    .get("longTextContent")
                    .and_then(Value::as_str)
                    .map(strip_markup)
            })
        })
        .last()
}
