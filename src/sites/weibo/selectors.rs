//! 微博页面选择器与正则
//!
//! 预编译的 CSS 选择器与正则表达式，按优先级排列，先命中者胜出。

use std::sync::OnceLock;

use regex::Regex;
use scraper::Selector;

/// 下一章链接规则：选择器 + 可选的锚文本关键字
pub struct NextLinkRule {
    pub selector: Selector,
    pub text: Option<&'static str>,
}

/// 站点选择器集合
pub struct SiteSelectors {
    pub title: Vec<Selector>,
    pub author: Vec<Selector>,
    pub data_author: Selector,
    pub time: Vec<Selector>,
    pub content: Vec<Selector>,
    pub next_links: Vec<NextLinkRule>,
    pub any_link: Selector,
    pub script: Selector,
}

/// 源码级正则，带名称以便日志定位
pub struct SitePatterns {
    pub uid: Vec<(&'static str, Regex)>,
    pub author: Vec<(&'static str, Regex)>,
    pub uid_in_href: Regex,
    pub long_text_object: Regex,
    pub charset: Regex,
    pub br: Regex,
    pub tag: Regex,
    pub fragment_id: Regex,
    pub excess_newlines: Regex,
    pub whitespace: Regex,
}

static SELECTORS: OnceLock<SiteSelectors> = OnceLock::new();
static PATTERNS: OnceLock<SitePatterns> = OnceLock::new();

fn parse_all(list: &[&str]) -> Vec<Selector> {
    list.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

impl SiteSelectors {
    /// 获取全局选择器实例
    pub fn get() -> &'static SiteSelectors {
        SELECTORS.get_or_init(|| SiteSelectors {
            title: parse_all(&[
                "title",
                "h1.title",
                ".WB_detail .title",
                ".article-title",
                r#"[class*="title"]"#,
            ]),
            author: parse_all(&[
                ".WB_detail .author",
                ".author-name",
                ".username",
                ".user-name",
                ".screen-name",
                ".nickname",
                ".WB_detail .WB_cardwrap .WB_info .W_f14",
                ".WB_info .W_f14",
                ".author",
                ".user",
                r#"[class*="author"]"#,
                r#"[class*="user"]"#,
                "[data-author]",
                r#"a[href*="/u/"]"#,
                r#"a[href*="weibo.com/"]"#,
            ]),
            data_author: Selector::parse("[data-author]").unwrap(),
            time: parse_all(&[
                ".WB_detail .time",
                ".publish-time",
                ".created-time",
                r#"[class*="time"]"#,
            ]),
            content: parse_all(&[
                r#".WB_editor_iframe_new[node-type="contentBody"]"#,
                ".WB_detail .WB_text",
                ".article-content",
                ".content-body",
                r#"[class*="content"][class*="body"]"#,
            ]),
            next_links: vec![
                NextLinkRule {
                    selector: Selector::parse(r#"a[href*="ttarticle"][title*="下一篇"]"#).unwrap(),
                    text: None,
                },
                NextLinkRule {
                    selector: Selector::parse(r#"a[href*="ttarticle"]"#).unwrap(),
                    text: Some("下一篇"),
                },
                NextLinkRule {
                    selector: Selector::parse(r#"a[href*="ttarticle"]"#).unwrap(),
                    text: Some("下一章"),
                },
                NextLinkRule {
                    selector: Selector::parse(r#".special-button a[href*="ttarticle"]"#).unwrap(),
                    text: None,
                },
                NextLinkRule {
                    selector: Selector::parse(r#"a[href*="show?id="]"#).unwrap(),
                    text: Some("下"),
                },
            ],
            any_link: Selector::parse("a[href]").unwrap(),
            script: Selector::parse("script").unwrap(),
        })
    }
}

impl SitePatterns {
    pub fn get() -> &'static SitePatterns {
        PATTERNS.get_or_init(|| SitePatterns {
            uid: vec![
                ("json_uid", Regex::new(r#""uid"\s*:\s*"?([0-9]+)"?"#).unwrap()),
                ("query_uid", Regex::new(r"uid=([0-9]+)").unwrap()),
                ("user_id", Regex::new(r#"user_id["']?\s*:\s*["']?([0-9]+)"#).unwrap()),
            ],
            author: ["author", "screen_name", "user_name", "nickname", "author_name"]
                .into_iter()
                .map(|key| {
                    let re = Regex::new(&format!(r#""{key}"\s*:\s*"([^"]+)""#)).unwrap();
                    (key, re)
                })
                .collect(),
            uid_in_href: Regex::new(r"/(?:u/)?([0-9]+)").unwrap(),
            long_text_object: Regex::new(r#"\{[^{}]*"longTextContent"[^{}]*\}"#).unwrap(),
            charset: Regex::new(r#"(?i)charset=["']?([^"'>\s]+)"#).unwrap(),
            br: Regex::new(r"(?i)<br\s*/?>").unwrap(),
            tag: Regex::new(r"<[^>]+>").unwrap(),
            fragment_id: Regex::new(r"id=([^&]+)").unwrap(),
            excess_newlines: Regex::new(r"\n{3,}").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_selectors_compile() {
        let s = SiteSelectors::get();
        assert_eq!(s.title.len(), 5);
        assert_eq!(s.author.len(), 15);
        assert_eq!(s.next_links.len(), 5);
        assert_eq!(SitePatterns::get().author.len(), 5);
    }
}
