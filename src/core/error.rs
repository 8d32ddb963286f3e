//! 错误处理体系 (Error Handling System)
//!
//! 定义领域相关的错误类型、访问拒绝原因以及全局 Result 别名。

use thiserror::Error;

/// 访问拒绝原因 (Deny Reasons)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// 响应体包含登录墙标记
    LoginRequired,
    /// 文章不存在或无查看权限
    NoPermission,
    /// 非 200 状态码
    Status(u16),
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::LoginRequired => write!(f, "LoginRequired"),
            DenyReason::NoPermission => write!(f, "NoPermission"),
            DenyReason::Status(code) => write!(f, "HTTP {}", code),
        }
    }
}

/// 全局错误定义 (Crawler Domain Errors)
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// 传输层失败 (超时、连接错误等非 reqwest 来源)
    #[error("Transport error: {0}")]
    Transport(String),

    /// 登录墙或权限不足，与传输失败同样处理：切换下一个端点
    #[error("Access denied: {0}")]
    AccessDenied(DenyReason),

    /// 声明编码的重新解码失败 (非致命)
    #[error("Decode error: {0}")]
    Decode(String),

    /// 响应中没有可用的标题或正文
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("All {0} endpoints exhausted")]
    EndpointsExhausted(usize),

    #[error("No chapter resolved (stopped: {0})")]
    NoChapters(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Parsing error: {0}")]
    Parse(String),
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, CrawlError>;

impl CrawlError {
    /// 错误分类标签，用于日志中定位数据源格式漂移
    pub fn kind(&self) -> &'static str {
        match self {
            CrawlError::Network(_) | CrawlError::Middleware(_) | CrawlError::Transport(_) => {
                "transport"
            }
            CrawlError::AccessDenied(_) => "access_denied",
            CrawlError::Decode(_) => "decode",
            CrawlError::ExtractionFailed(_) => "extraction",
            CrawlError::EndpointsExhausted(_) => "exhausted",
            CrawlError::NoChapters(_) => "no_chapters",
            CrawlError::Serialization(_) | CrawlError::Parse(_) => "parse",
            CrawlError::Io(_) => "io",
            CrawlError::Config(_) => "config",
        }
    }
}
