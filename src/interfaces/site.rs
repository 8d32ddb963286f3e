//! 文章来源定义
//!
//! Walker 只通过此接口与具体站点交互：从 URL 识别 ID、把 ID 解析为记录。

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::model::{ArticleRecord, RelatedArticle};

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// 站点唯一标识
    fn id(&self) -> &str;

    /// 从章节 URL 中提取文章 ID
    fn article_id(&self, url: &str) -> Option<String>;

    /// 将文章 ID 解析为已解析的记录
    ///
    /// 返回的记录保证 `is_resolved()`，否则返回错误。
    async fn resolve(&self, article_id: &str) -> Result<ArticleRecord>;

    /// 发现作者的其他文章 (可选)
    async fn related_articles(&self, _lead: &ArticleRecord) -> Vec<RelatedArticle> {
        Vec::new()
    }
}
