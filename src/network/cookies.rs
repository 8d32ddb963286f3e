//! Cookie 文件加载 (Cookie Loading)
//!
//! 支持 JSON 对象 (`{"SUB": "..."}`) 与浏览器导出的 Cookie 字符串
//! (`a=b; c=d` 或每行一个 `name=value`)。

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::info;

use crate::core::error::{CrawlError, Result};

/// 保持插入顺序的 Cookie 集合
pub type CookieJar = IndexMap<String, String>;

/// 解析浏览器导出的 Cookie 字符串
pub fn parse_cookie_string(raw: &str) -> CookieJar {
    let separator = if raw.contains(';') { ';' } else { '\n' };
    raw.split(separator)
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

pub fn parse_cookie_json(raw: &str) -> Result<CookieJar> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = value else {
        return Err(CrawlError::Parse("cookie JSON must be an object".into()));
    };
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            Value::Number(n) => Some((k, n.to_string())),
            Value::Bool(b) => Some((k, b.to_string())),
            _ => None,
        })
        .collect())
}

/// 从文件加载 Cookie，按首字符判定格式
///
/// 以 `{` 或 `[` 开头按 JSON 解析，其余按 Cookie 字符串解析；解析不出任何 Cookie 视为错误。
pub fn load_cookie_file(path: &Path) -> Result<CookieJar> {
    let content = std::fs::read_to_string(path)?;
    let content = content.trim();

    let jar = if content.starts_with(['{', '[']) {
        parse_cookie_json(content)?
    } else {
        let jar = parse_cookie_string(content);
        if jar.is_empty() {
            return Err(CrawlError::Parse(format!(
                "no cookies found in {}",
                path.display()
            )));
        }
        jar
    };
    info!("从 {} 加载了 {} 个 cookie", path.display(), jar.len());
    Ok(jar)
}

pub fn to_header(jar: &CookieJar) -> String {
    jar.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}
