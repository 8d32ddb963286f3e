//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 参数解析、日志初始化、依赖注入及一次抓取的生命周期管理。

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use ttarticle::core::config::AppConfig;
use ttarticle::core::event::create_event_channel;
use ttarticle::core::export::Exporter;
use ttarticle::engine::CrawlEngine;
use ttarticle::network::cookies::load_cookie_file;
use ttarticle::network::{HttpService, Session};
use ttarticle::sites::Weibo;
use ttarticle::text::Normalizer;
use ttarticle::ui::{Ui, get_multi};

/// 未指定 `--cookies` 时按顺序探测的文件
const COOKIE_CANDIDATES: [&str; 2] = ["cookies.json", "cookies.txt"];

/// 进度条感知的日志写入器
///
/// 确保日志输出不会破坏终端进度条的渲染布局。
struct IndicatifWriter;

impl io::Write for IndicatifWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let _ = get_multi().println(s.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for IndicatifWriter {
    type Writer = IndicatifWriter;

    fn make_writer(&self) -> Self::Writer {
        IndicatifWriter
    }
}

/// 微博头条文章爬虫，支持连载章节与 Cookie 登录
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 起始文章 URL
    url: String,

    /// Cookie 文件 (JSON 对象或浏览器导出的字符串)
    #[arg(short, long)]
    cookies: Option<PathBuf>,

    /// 最大章节数
    #[arg(short, long)]
    max_chapters: Option<usize>,

    /// 输出调试诊断
    #[arg(short, long)]
    debug: bool,

    /// 输出目录
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// 不获取作者的其他文章
    #[arg(long)]
    no_author_articles: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(IndicatifWriter)
        .with_target(false)
        .with_ansi(true)
        .init();

    // 配置文件 + 环境变量，命令行参数最后覆盖
    let mut config = AppConfig::load()?;
    if cli.debug {
        config.crawler.debug = true;
    }
    if cli.no_author_articles {
        config.crawler.fetch_author_articles = false;
    }
    if let Some(max) = cli.max_chapters {
        config.walker.max_chapters = max;
    }
    if let Some(out) = &cli.out {
        config.output.dir = out.display().to_string();
    }
    let config = Arc::new(config);

    let session = Arc::new(Session::new());
    session.set_ua(config.network.user_agent.clone());
    let cookie_path = cli
        .cookies
        .clone()
        .or_else(|| config.network.cookies_file.as_ref().map(PathBuf::from))
        .or_else(detect_cookie_file);
    match cookie_path {
        Some(path) => {
            let jar = load_cookie_file(&path)
                .with_context(|| format!("Failed to load cookies from {:?}", path))?;
            session.merge_cookies(&jar);
        }
        None => tracing::warn!("未找到 Cookie 文件，部分文章可能需要登录才能访问"),
    }

    let http = Arc::new(HttpService::new(&config.network, session)?);
    let site = Arc::new(Weibo::new(http, config.clone()));

    // 建立 UI 事件反馈链路
    let (event_sender, event_receiver) = create_event_channel();
    let ui_handle = Ui::run(event_receiver);

    let result = {
        let exporter = Exporter::new(&config.output.dir, Normalizer::default());
        let engine = CrawlEngine::new(site, config.clone(), exporter, event_sender);
        engine.run(&cli.url).await
    };

    // 发送端随 engine 释放，UI 循环随之结束
    let _ = ui_handle.await;

    let (report, paths) = result?;
    tracing::info!(
        "专栏章节 {} 篇，作者其他文章 {} 篇 -> {} / {}",
        report.total_chapters,
        report.total_other_articles,
        paths.json.display(),
        paths.markdown.display()
    );
    Ok(())
}

fn detect_cookie_file() -> Option<PathBuf> {
    COOKIE_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}
