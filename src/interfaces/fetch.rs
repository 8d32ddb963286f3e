//! HTTP 能力抽象 (HTTP Fetch Capability)
//!
//! 引擎只依赖 `get(url, headers, timeout)`，传输细节 (重试、TLS、连接池) 由实现方负责。

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

use crate::core::error::Result;

/// 一次请求的完整结果
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// 按 UTF-8 宽松解码的响应体
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// 一次具体的端点尝试
#[derive(Debug, Clone)]
pub struct EndpointAttempt {
    /// 1 起始，与日志中的模板序号一致
    pub index: usize,
    pub name: &'static str,
    pub url: String,
    pub headers: HeaderMap,
}

/// 阻塞语义的 GET 请求能力，调用方逐个 await
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str, headers: &HeaderMap, timeout: Duration)
    -> Result<FetchResponse>;
}
