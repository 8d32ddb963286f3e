use crate::core::error::DenyReason;
use crate::interfaces::fetch::FetchResponse;
use crate::interfaces::policy::{PolicyResult, ResponsePolicy};

/// 登录墙与权限检查策略
#[derive(Debug, Default)]
pub struct LoginWallPolicy;

impl LoginWallPolicy {
    pub fn new() -> Self {
        Self
    }

    fn fingerprint(&self, body: &str) -> Option<DenyReason> {
        if body.contains("微博不存在或暂无查看权限") {
            return Some(DenyReason::NoPermission);
        }
        // 宽松匹配：任何位置出现 login 都视为登录墙
        if body.contains("请登录") || body.to_lowercase().contains("login") {
            return Some(DenyReason::LoginRequired);
        }
        None
    }
}

impl ResponsePolicy for LoginWallPolicy {
    fn name(&self) -> &str {
        "login_wall"
    }

    fn check(&self, resp: &FetchResponse) -> PolicyResult {
        match self.fingerprint(&resp.text()) {
            Some(reason) => PolicyResult::Deny(reason),
            None => PolicyResult::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn resp(body: &str) -> FetchResponse {
        FetchResponse::new(200, HeaderMap::new(), body.to_string())
    }

    #[test]
    fn detects_login_and_permission_markers() {
        let policy = LoginWallPolicy::new();
        assert_eq!(
            policy.check(&resp("<div>请登录后查看</div>")),
            PolicyResult::Deny(DenyReason::LoginRequired)
        );
        assert_eq!(
            policy.check(&resp(r#"{"url":"https://passport.weibo.com/LOGIN"}"#)),
            PolicyResult::Deny(DenyReason::LoginRequired)
        );
        assert_eq!(
            policy.check(&resp("微博不存在或暂无查看权限!")),
            PolicyResult::Deny(DenyReason::NoPermission)
        );
        assert_eq!(policy.check(&resp(r#"{"code":"100000"}"#)), PolicyResult::Pass);
    }
}
