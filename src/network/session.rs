use std::sync::Arc;

use parking_lot::RwLock;

use crate::network::cookies::{CookieJar, to_header};

#[derive(Debug, Default)]
pub struct Session {
    pub ua: Arc<RwLock<String>>,
    pub cookie: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_ua(&self) -> String {
        self.ua.read().clone()
    }

    pub fn set_ua(&self, ua: String) {
        *self.ua.write() = ua;
    }

    pub fn get_cookie(&self) -> Option<String> {
        self.cookie.read().clone()
    }

    pub fn set_cookie(&self, cookie: String) {
        *self.cookie.write() = Some(cookie);
    }

    /// 合并 Cookie，已存在的同名项被覆盖
    pub fn merge_cookies(&self, jar: &CookieJar) {
        let mut merged = self
            .get_cookie()
            .map(|c| crate::network::cookies::parse_cookie_string(&c))
            .unwrap_or_default();
        for (k, v) in jar {
            merged.insert(k.clone(), v.clone());
        }
        if !merged.is_empty() {
            self.set_cookie(to_header(&merged));
        }
    }
}
