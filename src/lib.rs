//! 微博头条连载文章抓取器 (Weibo Serialized Article Crawler)
//!
//! 从一篇文章出发沿下一章链接逐章抓取，规范化后导出为 JSON 与 Markdown。

pub mod core;
pub mod engine;
pub mod interfaces;
pub mod network;
pub mod sites;
pub mod text;
pub mod ui;
pub mod utils;
