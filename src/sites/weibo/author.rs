//! 作者其他文章发现 (Author Article Discovery)
//!
//! 先按 UID 查询作者主页接口，未果再按作者名搜索。所有失败只记录日志，返回空列表。

use std::sync::Arc;
use std::time::Duration;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::decode::value_to_string;
use crate::core::model::{ArticleRecord, RelatedArticle};
use crate::interfaces::HttpFetch;
use crate::utils::truncate_chars;

const TITLE_PREVIEW_CHARS: usize = 100;

pub struct AuthorDiscovery {
    fetcher: Arc<dyn HttpFetch>,
    timeout: Duration,
    debug: bool,
}

impl AuthorDiscovery {
    pub fn new(fetcher: Arc<dyn HttpFetch>, timeout: Duration, debug: bool) -> Self {
        Self {
            fetcher,
            timeout,
            debug,
        }
    }

    pub async fn discover(&self, lead: &ArticleRecord) -> Vec<RelatedArticle> {
        let Some(author) = lead.author_name.as_deref().filter(|a| !a.is_empty()) else {
            info!("未找到作者信息，跳过作者文章发现");
            return Vec::new();
        };
        let query = author.split_whitespace().next().unwrap_or(author);
        info!(author = %query, uid = ?lead.author_id, "正在获取作者的其他文章");

        if let Some(uid) = lead.author_id.as_deref() {
            let found = self.try_urls("UID", &uid_urls(uid)).await;
            if !found.is_empty() {
                return found;
            }
        }

        let found = self.try_urls("Search", &search_urls(query)).await;
        if found.is_empty() {
            info!("未能获取到作者的其他文章");
        }
        found
    }

    /// 第一个解析出非空列表的接口胜出
    async fn try_urls(&self, kind: &str, urls: &[String]) -> Vec<RelatedArticle> {
        for (i, url) in urls.iter().enumerate() {
            let label = format!("{kind}-{}", i + 1);
            debug!(label = %label, url = %url, "尝试作者文章接口");

            let resp = match self.fetcher.get(url, &HeaderMap::new(), self.timeout).await {
                Ok(resp) if resp.is_ok() => resp,
                Ok(resp) => {
                    warn!(label = %label, status = resp.status, "作者文章接口请求失败");
                    continue;
                }
                Err(e) => {
                    warn!(label = %label, kind = e.kind(), "作者文章接口请求出错: {}", e);
                    continue;
                }
            };
            if self.debug {
                debug!(label = %label, body_len = resp.body.len(), "作者文章接口响应");
            }

            let value: Value = match serde_json::from_slice(&resp.body) {
                Ok(v) => v,
                Err(e) => {
                    warn!(label = %label, "返回的不是有效的 JSON: {}", e);
                    continue;
                }
            };

            let articles = parse_articles(&value, &label);
            if !articles.is_empty() {
                info!(label = %label, count = articles.len(), "找到作者文章");
                return articles;
            }
        }
        Vec::new()
    }
}

fn uid_urls(uid: &str) -> Vec<String> {
    vec![
        format!("https://weibo.com/ajax/statuses/mymblog?uid={uid}&page=1&feature=0"),
        format!("https://m.weibo.cn/api/container/getIndex?containerid=107603{uid}"),
        format!("https://weibo.com/ttarticle/api/profile/articles?uid={uid}&page_size=20&page=1"),
    ]
}

fn search_urls(author: &str) -> Vec<String> {
    let q = utf8_percent_encode(author, NON_ALPHANUMERIC).to_string();
    vec![
        format!("https://m.weibo.cn/api/container/getIndex?containerid=100103type%3D1%26q%3D{q}"),
        format!("https://weibo.com/ajax/search/searchall?q={q}&xsort=time"),
        format!("https://m.weibo.cn/api/container/getIndex?containerid=100103type%3D60%26q%3D{q}"),
    ]
}

fn str_of(value: &Value, key: &str) -> String {
    value_to_string(value.get(key)).unwrap_or_default()
}

fn is_article_page(item: &Value) -> bool {
    item.get("page_info")
        .and_then(|p| p.get("type"))
        .and_then(Value::as_str)
        == Some("article")
}

fn preview_title(text: &str) -> String {
    let text = text.replace("<br />", "\n");
    format!("{}...", truncate_chars(&text, TITLE_PREVIEW_CHARS))
}

fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// 解析各接口的文章列表，`label` 记录来源接口
pub fn parse_articles(value: &Value, label: &str) -> Vec<RelatedArticle> {
    let mut articles = Vec::new();
    let Some(data) = value.get("data") else {
        return articles;
    };

    let entry = |title: String, url: String, created_at: String, summary: Option<String>| RelatedArticle {
        title,
        url,
        created_at,
        summary,
        source: label.to_string(),
    };

    if value.get("ok").and_then(Value::as_i64) == Some(1) {
        if data.get("cards").is_some() {
            for mblog in array(data, "cards").iter().filter_map(|c| c.get("mblog")) {
                let text = str_of(mblog, "text");
                if is_article_page(mblog) {
                    let page = &mblog["page_info"];
                    articles.push(entry(
                        str_of(page, "page_title"),
                        str_of(page, "page_url"),
                        str_of(mblog, "created_at"),
                        Some(text.replace("<br />", "\n")),
                    ));
                } else {
                    articles.push(entry(
                        preview_title(&text),
                        format!("https://m.weibo.cn/status/{}", str_of(mblog, "bid")),
                        str_of(mblog, "created_at"),
                        None,
                    ));
                }
            }
        } else {
            for item in array(data, "list").iter().filter(|i| is_article_page(i)) {
                let page = &item["page_info"];
                let summary = value_to_string(item.get("text_raw")).unwrap_or_else(|| str_of(item, "text"));
                articles.push(entry(
                    str_of(page, "page_title"),
                    str_of(page, "page_url"),
                    str_of(item, "created_at"),
                    Some(summary),
                ));
            }
        }
    } else if data.is_object() {
        if data.get("list").is_some() {
            for item in array(data, "list").iter().filter(|i| i.get("text").is_some()) {
                articles.push(entry(
                    preview_title(&str_of(item, "text")),
                    format!("https://weibo.com/status/{}", str_of(item, "id")),
                    str_of(item, "created_at"),
                    None,
                ));
            }
        } else {
            for item in array(data, "articles") {
                articles.push(entry(
                    str_of(item, "title"),
                    format!("https://weibo.com/ttarticle/p/show?id={}", str_of(item, "id")),
                    str_of(item, "create_time"),
                    value_to_string(item.get("summary")),
                ));
            }
        }
    }

    debug!(label = %label, count = articles.len(), "解析作者文章列表");
    articles
}
