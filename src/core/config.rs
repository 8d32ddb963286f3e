//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 与 `TTARTICLE__*` 环境变量的反序列化及其层级结构映射，
//! 所有字段均有默认值回退。

use std::path::Path;
use std::time::Duration;

use bon::Builder;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::error::{CrawlError, Result};

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct AppConfig {
    /// 抓取流程参数
    #[serde(default)]
    #[builder(default)]
    pub crawler: CrawlerConfig,

    /// 章节遍历参数
    #[serde(default)]
    #[builder(default)]
    pub walker: WalkerConfig,

    /// 网络层参数
    #[serde(default)]
    #[builder(default)]
    pub network: NetworkConfig,

    /// 输出目录
    #[serde(default)]
    #[builder(default)]
    pub output: OutputConfig,
}

/// 抓取流程参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct CrawlerConfig {
    /// 调试诊断开关，显式传递给端点回退驱动与内容提取器
    #[serde(default)]
    pub debug: bool,
    /// 是否在章节遍历后发现作者的其他文章
    #[serde(default = "default_true")]
    pub fetch_author_articles: bool,
    /// 端点尝试之间的礼貌延迟，显式设为 0 才会关闭
    #[serde(default = "default_endpoint_delay_ms")]
    pub endpoint_delay_ms: u64,
}

/// 章节遍历参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct WalkerConfig {
    /// 章节数上限
    #[serde(default = "default_max_chapters")]
    pub max_chapters: usize,
    /// 章节之间的礼貌延迟
    #[serde(default = "default_chapter_delay_ms")]
    pub chapter_delay_ms: u64,
    /// 遇到本次已访问的文章 ID 时停止
    #[serde(default = "default_true")]
    pub stop_on_revisit: bool,
}

/// 网络层参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct NetworkConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_mobile_user_agent")]
    pub mobile_user_agent: String,
    /// 端点请求超时
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 全文补抓与作者文章发现的请求超时
    #[serde(default = "default_followup_timeout_secs")]
    pub followup_timeout_secs: u64,
    /// 可选上游代理 (http/socks)
    pub proxy: Option<String>,
    /// Cookie 文件路径 (JSON 或浏览器导出的字符串)
    pub cookies_file: Option<String>,
}

/// 输出参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            fetch_author_articles: true,
            endpoint_delay_ms: default_endpoint_delay_ms(),
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_chapters: default_max_chapters(),
            chapter_delay_ms: default_chapter_delay_ms(),
            stop_on_revisit: true,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            mobile_user_agent: default_mobile_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            followup_timeout_secs: default_followup_timeout_secs(),
            proxy: None,
            cookies_file: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_endpoint_delay_ms() -> u64 {
    1000
}
fn default_max_chapters() -> usize {
    50
}
fn default_chapter_delay_ms() -> u64 {
    3000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_mobile_user_agent() -> String {
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1".to_string()
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_followup_timeout_secs() -> u64 {
    10
}
fn default_output_dir() -> String {
    ".".to_string()
}

impl CrawlerConfig {
    pub fn endpoint_delay(&self) -> Duration {
        Duration::from_millis(self.endpoint_delay_ms)
    }
}

impl WalkerConfig {
    pub fn chapter_delay(&self) -> Duration {
        Duration::from_millis(self.chapter_delay_ms)
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn followup_timeout(&self) -> Duration {
        Duration::from_secs(self.followup_timeout_secs)
    }
}

impl AppConfig {
    /// 从文件系统与环境变量中加载并解析配置
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let builder = Config::builder();

        let builder = if config_path.exists() {
            builder.add_source(File::from(config_path))
        } else {
            builder
        };

        let settings = builder
            .add_source(
                Environment::with_prefix("TTARTICLE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(CrawlError::Config)?;
        settings.try_deserialize().map_err(CrawlError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_politeness_delays() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.walker.max_chapters, 50);
        assert_eq!(cfg.walker.chapter_delay(), Duration::from_secs(3));
        assert_eq!(cfg.crawler.endpoint_delay(), Duration::from_secs(1));
        assert_eq!(cfg.network.request_timeout(), Duration::from_secs(15));
        assert!(cfg.walker.stop_on_revisit);
        assert!(!cfg.crawler.debug);
    }

    #[test]
    fn loads_partial_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[walker]\nmax_chapters = 7\n\n[crawler]\ndebug = true\n").unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.walker.max_chapters, 7);
        assert_eq!(cfg.walker.chapter_delay_ms, 3000);
        assert!(cfg.crawler.debug);
        assert!(cfg.crawler.fetch_author_articles);
        assert_eq!(cfg.output.dir, ".");
    }

    #[test]
    fn builder_sets_walker_fields() {
        let walker = WalkerConfig::builder()
            .max_chapters(3)
            .chapter_delay_ms(0)
            .stop_on_revisit(false)
            .build();
        assert_eq!(walker.max_chapters, 3);
        assert_eq!(walker.chapter_delay(), Duration::ZERO);
    }
}
