//! JSON 形态的字段提取
//!
//! 纯函数，不发起请求。全文补抓由 [`super::extract::Extractor`] 负责。

use serde_json::Value;
use tracing::debug;

use super::decode::{strip_markup, unescape_lossy, value_to_string};
use crate::core::error::{CrawlError, Result};
use crate::core::model::ArticleRecord;

const SHOW_URL: &str = "https://weibo.com/ttarticle/p/show?id=";

const DETAIL_AUTHOR_KEYS: [&str; 5] = ["author", "author_name", "user_name", "screen_name", "nickname"];

fn str_field<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// 头条文章详情接口 (`code == "100000"`)
///
/// 正文缺失时以摘要代替，并返回 `data.url` 作为全文补抓地址。
pub fn extract_detail(data: &Value, id: &str, url: &str) -> (ArticleRecord, Option<String>) {
    let mut record = ArticleRecord::new(id, url);

    record.title = unescape_lossy(str_field(data, "title"));

    record.author_name = DETAIL_AUTHOR_KEYS
        .iter()
        .find_map(|key| value_to_string(data.get(*key)))
        .map(|name| unescape_lossy(&name));
    record.author_id = value_to_string(data.get("uid"));

    record.publish_time = value_to_string(data.get("create_at"))
        .or_else(|| value_to_string(data.get("complete_create_at")))
        .unwrap_or_default();

    let content = str_field(data, "content");
    if !content.is_empty() {
        record.body = strip_markup(&unescape_lossy(content));
    }

    let mut followup = None;
    if record.body.is_empty() {
        record.body = str_field(data, "summary").to_string();
        followup = value_to_string(data.get("url"));
    }

    record.next_chapter_ref = detail_next_pointer(data);
    if record.author_name.is_none() {
        debug!(keys = ?object_keys(data), "详情数据中未找到作者字段");
    }

    (record, followup)
}

/// 下一章指针优先级：sibling.next.url > sibling.next.id > next_article_id > series_info.next_id
fn detail_next_pointer(data: &Value) -> Option<String> {
    let next = data
        .get("sibling")
        .and_then(|s| s.get("next"))
        .filter(|n| n.is_object());

    if let Some(next) = next {
        if let Some(url) = value_to_string(next.get("url")) {
            return Some(url);
        }
        if let Some(next_id) = value_to_string(next.get("id")) {
            return Some(format!("{SHOW_URL}{next_id}"));
        }
    }

    value_to_string(data.get("next_article_id"))
        .or_else(|| value_to_string(data.get("series_info").and_then(|s| s.get("next_id"))))
        .map(|next_id| format!("{SHOW_URL}{next_id}"))
}

/// 微博状态接口 (`ok == 1` 或 `data` 包装)
pub fn extract_status(data: &Value, id: &str, url: &str) -> Result<ArticleRecord> {
    let mut record = ArticleRecord::new(id, url);

    let content = value_to_string(data.get("longTextContent"))
        .or_else(|| value_to_string(data.get("text")))
        .unwrap_or_default();
    record.body = strip_markup(&content);
    record.title = str_field(data, "title").to_string();

    match data.get("user").filter(|u| u.is_object()) {
        Some(user) => {
            record.author_name = value_to_string(user.get("screen_name"))
                .or_else(|| value_to_string(user.get("name")));
            record.author_id = value_to_string(user.get("id"));
        }
        None => {
            record.author_name = value_to_string(data.get("author"))
                .or_else(|| value_to_string(data.get("screen_name")));
        }
    }
    record.publish_time = value_to_string(data.get("created_at")).unwrap_or_default();

    if !record.is_resolved() {
        return Err(CrawlError::ExtractionFailed(format!(
            "status payload without title or text ({url})"
        )));
    }
    Ok(record)
}

pub fn object_keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
