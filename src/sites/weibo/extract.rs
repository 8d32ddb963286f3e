//! 内容提取器 (Content Extractor)
//!
//! 按响应形态分派到各自的提取规则；详情接口缺正文时，补抓一次 `data.url`。

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::classify::{Shape, inspect};
use super::decode::redecode_declared_charset;
use super::{html, json};
use crate::core::error::{CrawlError, Result};
use crate::core::model::ArticleRecord;
use crate::interfaces::{FetchResponse, HttpFetch};

/// 全文补抓的最大深度
const MAX_FOLLOWUP_DEPTH: u8 = 1;

/// 静态提取结果：记录 + 可选的全文补抓地址
pub struct StaticExtraction {
    pub record: ArticleRecord,
    pub followup: Option<String>,
}

pub struct Extractor {
    fetcher: Arc<dyn HttpFetch>,
    followup_timeout: Duration,
    debug: bool,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn HttpFetch>, followup_timeout: Duration, debug: bool) -> Self {
        Self {
            fetcher,
            followup_timeout,
            debug,
        }
    }

    pub async fn extract(&self, resp: &FetchResponse, id: &str, url: &str) -> Result<ArticleRecord> {
        let StaticExtraction {
            mut record,
            mut followup,
        } = self.extract_static(&resp.body, resp.content_type(), id, url)?;

        let mut depth = 0;
        while let Some(followup_url) = followup.take() {
            if depth >= MAX_FOLLOWUP_DEPTH {
                debug!(url = %followup_url, "已达补抓深度上限，跳过");
                break;
            }
            depth += 1;
            followup = self.apply_followup(&mut record, &followup_url, id).await;
        }

        if !record.is_resolved() {
            return Err(CrawlError::ExtractionFailed(format!(
                "detail payload without title or content ({url})"
            )));
        }
        Ok(record)
    }

    /// 补抓全文：成功时采用其正文，下一章指针仅在原记录缺失时采用
    ///
    /// 返回补抓页面自身的补抓地址，由调用方按深度上限决定是否继续。
    async fn apply_followup(&self, record: &mut ArticleRecord, url: &str, id: &str) -> Option<String> {
        info!(url = %url, "尝试获取完整文章内容");

        let resp = match self
            .fetcher
            .get(url, &HeaderMap::new(), self.followup_timeout)
            .await
        {
            Ok(resp) if resp.is_ok() => resp,
            Ok(resp) => {
                warn!(url = %url, status = resp.status, "全文补抓失败");
                return None;
            }
            Err(e) => {
                warn!(url = %url, kind = e.kind(), "全文补抓失败: {}", e);
                return None;
            }
        };

        match self.extract_static(&resp.body, resp.content_type(), id, url) {
            Ok(StaticExtraction { record: full, followup }) => {
                if !full.body.is_empty() {
                    record.body = full.body;
                }
                if record.next_chapter_ref.is_none() {
                    record.next_chapter_ref = full.next_chapter_ref;
                }
                followup
            }
            Err(e) => {
                warn!(url = %url, kind = e.kind(), "全文解析失败: {}", e);
                None
            }
        }
    }

    /// 不涉及网络的提取，按形态分派
    pub fn extract_static(
        &self,
        raw: &[u8],
        content_type: Option<&str>,
        id: &str,
        url: &str,
    ) -> Result<StaticExtraction> {
        let lossy = String::from_utf8_lossy(raw);
        let classified = inspect(&lossy, content_type);
        debug!(url = %url, shape = %classified.shape, "响应形态");

        match (classified.shape, classified.json) {
            (Shape::JsonDetail, Some(root)) => {
                let data = &root["data"];
                if self.debug {
                    self.log_json_keys(data);
                }
                let (record, followup) = json::extract_detail(data, id, url);
                Ok(StaticExtraction { record, followup })
            }
            (Shape::JsonOk | Shape::JsonWrapper, Some(root)) => {
                if self.debug {
                    self.log_json_keys(&root["data"]);
                }
                let record = json::extract_status(&root["data"], id, url)?;
                Ok(StaticExtraction {
                    record,
                    followup: None,
                })
            }
            (shape, _) => {
                if shape == Shape::Unparseable {
                    debug!(url = %url, "未知 JSON 结构，回退到 HTML 规则");
                }
                let text = redecode_declared_charset(raw, &lossy).unwrap_or_else(|| lossy.into_owned());
                let record = html::extract_html(&text, id, url)?;
                Ok(StaticExtraction {
                    record,
                    followup: None,
                })
            }
        }
    }

    fn log_json_keys(&self, data: &Value) {
        let keys = json::object_keys(data);
        let linked: Vec<&str> = keys
            .iter()
            .copied()
            .filter(|k| {
                let k = k.to_lowercase();
                k.contains("next") || k.contains("series") || k.contains("chapter")
            })
            .collect();
        debug!(keys = ?keys, linked = ?linked, "JSON 数据键");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::fallback::tests::FakeFetch;

    fn extractor(fake: FakeFetch) -> Extractor {
        Extractor::new(Arc::new(fake), Duration::from_secs(1), true)
    }

    #[test]
    fn unknown_json_falls_through_to_html_and_fails() {
        let ex = extractor(FakeFetch::default());
        let err = ex
            .extract_static(br#"{"foo":"bar"}"#, Some("application/json"), "1", "u")
            .err()
            .unwrap();
        assert!(matches!(err, CrawlError::ExtractionFailed(_)));
    }

    #[test]
    fn gbk_page_extracts_without_mojibake() {
        let page = "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=gb2312\">\
                    <title>第三章 归来</title></head><body></body></html>";
        let (bytes, _, _) = encoding_rs::GBK.encode(page);

        let ex = extractor(FakeFetch::default());
        let out = ex.extract_static(&bytes, Some("text/html"), "3", "u").unwrap();
        assert_eq!(out.record.title, "第三章 归来");
    }

    #[tokio::test]
    async fn followup_replaces_summary_once() {
        let detail = r#"{"code":"100000","data":{"title":"短","summary":"摘要","url":"https://weibo.com/full/1"}}"#;
        // 补抓页自身也缺正文并指向下一层地址，深度上限为 1 时不得继续请求
        let full = r#"{"code":"100000","data":{"title":"全","summary":"较长的摘要","url":"https://weibo.com/full/2",
            "sibling":{"next":{"id":"2"}}}}"#;
        let nested = r#"{"code":"100000","data":{"title":"更深","content":"不应出现","url":"https://weibo.com/full/3"}}"#;
        let fake = Arc::new(
            FakeFetch::default()
                .route("https://weibo.com/full/1", 200, full)
                .route("https://weibo.com/full/2", 200, nested),
        );
        let ex = Extractor::new(fake.clone(), Duration::from_secs(1), true);

        let resp = FetchResponse::new(200, HeaderMap::new(), detail.to_string());
        let record = ex.extract(&resp, "1", "u").await.unwrap();

        assert_eq!(*fake.calls.lock(), vec!["https://weibo.com/full/1".to_string()]);
        assert_eq!(record.title, "短");
        assert_eq!(record.body, "较长的摘要");
        assert_eq!(
            record.next_chapter_ref.as_deref(),
            Some("https://weibo.com/ttarticle/p/show?id=2")
        );
    }
}
