//! 微博头条文章站点模块
//!
//! 按职责拆分：端点模板、响应分类、解码、JSON/HTML 提取、作者文章发现。

pub mod author;
pub mod classify;
pub mod decode;
pub mod endpoints;
pub mod extract;
pub mod html;
pub mod json;
mod selectors;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::core::model::{ArticleRecord, RelatedArticle};
use crate::engine::fallback::FallbackDriver;
use crate::interfaces::{ArticleSource, HttpFetch};
use crate::network::policies::default_policies;

pub use self::author::AuthorDiscovery;
pub use self::classify::{Shape, classify};
pub use self::endpoints::{ENDPOINTS, plan};
pub use self::extract::Extractor;
pub use self::selectors::{SitePatterns, SiteSelectors};

const WEIBO_BASE: &str = "https://weibo.com/";

/// 微博头条文章站点实现
pub struct Weibo {
    config: Arc<AppConfig>,
    driver: FallbackDriver,
    extractor: Extractor,
    author: AuthorDiscovery,
}

impl Weibo {
    pub fn new(fetcher: Arc<dyn HttpFetch>, config: Arc<AppConfig>) -> Self {
        let debug = config.crawler.debug;
        let net = &config.network;

        Self {
            driver: FallbackDriver::new(
                fetcher.clone(),
                default_policies(),
                net.request_timeout(),
                config.crawler.endpoint_delay(),
                debug,
            ),
            extractor: Extractor::new(fetcher.clone(), net.followup_timeout(), debug),
            author: AuthorDiscovery::new(fetcher, net.followup_timeout(), debug),
            config,
        }
    }
}

/// 从章节 URL 中提取文章 ID
///
/// `#/...id=...` 形式的片段优先，其次是查询参数 `id`。
/// 相对路径、协议相对 (`//host/...`) 与缺少协议的地址都基于 `https://weibo.com/` 解析。
pub fn extract_article_id(url: &str) -> Option<String> {
    if let Some((_, fragment)) = url.rsplit_once("#/")
        && let Some(caps) = SitePatterns::get().fragment_id.captures(fragment)
    {
        return Some(caps[1].to_string());
    }

    let base = Url::parse(WEIBO_BASE).ok()?;
    Url::options()
        .base_url(Some(&base))
        .parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, v)| k == "id" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

#[async_trait]
impl ArticleSource for Weibo {
    fn id(&self) -> &str {
        "weibo"
    }

    fn article_id(&self, url: &str) -> Option<String> {
        let id = extract_article_id(url);
        debug!(url = %url, id = ?id, "解析文章 ID");
        id
    }

    async fn resolve(&self, article_id: &str) -> Result<ArticleRecord> {
        info!(id = %article_id, "正在获取文章内容");
        let attempts = plan(article_id, &self.config.network);
        let extractor = &self.extractor;

        self.driver
            .run(attempts, |url, resp| async move {
                extractor.extract(&resp, article_id, &url).await
            })
            .await
    }

    async fn related_articles(&self, lead: &ArticleRecord) -> Vec<RelatedArticle> {
        if !self.config.crawler.fetch_author_articles {
            return Vec::new();
        }
        self.author.discover(lead).await
    }
}
