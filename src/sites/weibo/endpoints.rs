//! 端点模板 (Endpoint Templates)
//!
//! 六个候选接口按固定顺序尝试，每个模板携带自己的请求头画像。

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};
use strum::Display;

use crate::core::config::NetworkConfig;
use crate::interfaces::EndpointAttempt;

/// 请求头画像
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RequestProfile {
    /// 会话默认桌面端请求头
    Desktop,
    /// iPhone UA + m.weibo.cn Referer
    Mobile,
    /// XHR 请求头 + 文章页 Referer
    Ajax,
}

#[derive(Debug, Clone, Copy)]
pub struct EndpointTemplate {
    pub name: &'static str,
    /// `{id}` 为文章 ID 占位符
    pub pattern: &'static str,
    pub profile: RequestProfile,
}

pub const ENDPOINTS: [EndpointTemplate; 6] = [
    EndpointTemplate {
        name: "ttarticle_detail",
        pattern: "https://weibo.com/ttarticle/x/m/aj/detail?id={id}",
        profile: RequestProfile::Ajax,
    },
    EndpointTemplate {
        name: "mobile_extend",
        pattern: "https://m.weibo.cn/statuses/extend?id={id}",
        profile: RequestProfile::Mobile,
    },
    EndpointTemplate {
        name: "ajax_longtext",
        pattern: "https://weibo.com/ajax/statuses/longtext?id={id}",
        profile: RequestProfile::Ajax,
    },
    EndpointTemplate {
        name: "card_article",
        pattern: "https://card.weibo.com/article/m/show/id/{id}",
        profile: RequestProfile::Desktop,
    },
    EndpointTemplate {
        name: "article_page",
        pattern: "https://weibo.com/ttarticle/p/show?id={id}",
        profile: RequestProfile::Desktop,
    },
    EndpointTemplate {
        name: "ajax_show",
        pattern: "https://weibo.com/ajax/statuses/show?id={id}",
        profile: RequestProfile::Ajax,
    },
];

impl EndpointTemplate {
    pub fn resolve(&self, id: &str) -> String {
        self.pattern.replace("{id}", id)
    }

    pub fn headers(&self, id: &str, config: &NetworkConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match self.profile {
            RequestProfile::Desktop => {}
            RequestProfile::Mobile => {
                insert(&mut headers, USER_AGENT, &config.mobile_user_agent);
                headers.insert(REFERER, HeaderValue::from_static("https://m.weibo.cn/"));
            }
            RequestProfile::Ajax => {
                headers.insert(
                    HeaderName::from_static("x-requested-with"),
                    HeaderValue::from_static("XMLHttpRequest"),
                );
                insert(
                    &mut headers,
                    REFERER,
                    &format!("https://weibo.com/ttarticle/p/show?id={id}"),
                );
                headers.insert(
                    ACCEPT,
                    HeaderValue::from_static("application/json, text/plain, */*"),
                );
            }
        }
        headers
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(v) = HeaderValue::from_str(value) {
        headers.insert(name, v);
    }
}

/// 为文章 ID 生成按顺序排列的端点尝试
pub fn plan(id: &str, config: &NetworkConfig) -> Vec<EndpointAttempt> {
    ENDPOINTS
        .iter()
        .enumerate()
        .map(|(i, tpl)| EndpointAttempt {
            index: i + 1,
            name: tpl.name,
            url: tpl.resolve(id),
            headers: tpl.headers(id, config),
        })
        .collect()
}
