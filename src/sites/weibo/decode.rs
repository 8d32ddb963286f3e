//! 文本解码辅助
//!
//! JSON 字符串中残留的 `\uXXXX` 转义、HTML 片段的标签清理，以及 GBK 系页面的重新解码。

use encoding_rs::Encoding;
use serde_json::Value;
use tracing::{debug, warn};

use super::selectors::SitePatterns;
use crate::core::error::{CrawlError, Result};

/// 还原残留的反斜杠转义，只在文本包含 `\u` 时调用
pub fn unescape_unicode(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let high = read_hex4(&mut chars)?;
                if (0xD800..0xDC00).contains(&high) {
                    // 代理对：必须紧跟 \uDC00-\uDFFF
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(CrawlError::Decode(format!("unpaired surrogate {high:04x}")));
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(CrawlError::Decode(format!("invalid low surrogate {low:04x}")));
                    }
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(code).ok_or_else(|| {
                        CrawlError::Decode(format!("invalid code point {code:x}"))
                    })?);
                } else {
                    out.push(char::from_u32(high).ok_or_else(|| {
                        CrawlError::Decode(format!("invalid code point {high:x}"))
                    })?);
                }
            }
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}

fn read_hex4(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<u32> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 {
        return Err(CrawlError::Decode(format!("truncated escape \\u{digits}")));
    }
    u32::from_str_radix(&digits, 16)
        .map_err(|_| CrawlError::Decode(format!("invalid escape \\u{digits}")))
}

/// 转义失败时保留原文
pub fn unescape_lossy(text: &str) -> String {
    if !text.contains("\\u") {
        return text.to_string();
    }
    match unescape_unicode(text) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!(error = %e, "转义还原失败，保留原文");
            text.to_string()
        }
    }
}

/// `<br>` 系列转换为换行，其余标签删除
pub fn strip_markup(fragment: &str) -> String {
    let p = SitePatterns::get();
    let with_breaks = p.br.replace_all(fragment, "\n");
    p.tag.replace_all(&with_breaks, "").into_owned()
}

/// 将 JSON 标量转为字符串，空值返回 None
pub fn value_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 页面声明了 GBK 系编码且字节不是合法 UTF-8 时，按 GB18030 重新解码
///
/// 失败不致命，返回 None 由调用方继续使用宽松解码的文本。
pub fn redecode_declared_charset(raw: &[u8], lossy: &str) -> Option<String> {
    if !lossy.to_ascii_lowercase().contains("charset=") {
        return None;
    }
    let label = SitePatterns::get()
        .charset
        .captures(lossy)
        .map(|c| c[1].to_ascii_lowercase())?;

    if !matches!(label.as_str(), "gbk" | "gb2312" | "gb18030") {
        return None;
    }
    if std::str::from_utf8(raw).is_ok() {
        debug!(charset = %label, "声明编码为 GBK 系，但内容已是 UTF-8");
        return None;
    }

    // encoding_rs 对 GBK 系标签统一使用 GB18030 解码器 (超集)
    let encoding = Encoding::for_label(label.as_bytes())?;
    match encoding.decode_without_bom_handling_and_without_replacement(raw) {
        Some(text) => {
            debug!(charset = %label, "已按声明编码重新解码页面");
            Some(text.into_owned())
        }
        None => {
            let err = CrawlError::Decode(format!("malformed {label} byte sequence"));
            warn!(error = %err, "重新解码失败，使用原始内容");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_bmp_and_surrogate_pairs() {
        assert_eq!(unescape_unicode(r"\u7b2c\u4e00\u7ae0").unwrap(), "第一章");
        assert_eq!(unescape_unicode(r"a\ud83d\ude00b").unwrap(), "a😀b");
        assert_eq!(unescape_unicode(r"x\ny\/z").unwrap(), "x\ny/z");
        assert!(unescape_unicode(r"\u12").is_err());
        assert_eq!(unescape_lossy(r"bad \uZZZZ"), r"bad \uZZZZ");
    }

    #[test]
    fn strips_tags_and_keeps_breaks() {
        assert_eq!(
            strip_markup("一<br>二<BR/>三<br />四<p class=\"x\">五</p>"),
            "一\n二\n三\n四五"
        );
    }

    #[test]
    fn redecodes_gb2312_page() {
        let html = "<html><head><meta charset=\"gb2312\"><title>中文标题</title></head></html>";
        let (bytes, _, _) = encoding_rs::GBK.encode(html);
        let lossy = String::from_utf8_lossy(&bytes);

        let decoded = redecode_declared_charset(&bytes, &lossy).unwrap();
        assert!(decoded.contains("中文标题"));
        assert!(!decoded.contains('\u{FFFD}'));
    }

    #[test]
    fn skips_utf8_pages_that_declare_gbk() {
        let html = "<meta charset=gbk><p>已经是 UTF-8</p>";
        assert_eq!(redecode_declared_charset(html.as_bytes(), html), None);
    }
}
