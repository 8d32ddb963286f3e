use std::sync::Arc;

use reqwest::header::{COOKIE, HeaderValue, USER_AGENT};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::debug;

use crate::network::session::Session;

/// 会话注入中间件
///
/// 负责在每次请求前，将 Session 中的 Cookie/UA 注入 Header。
/// 端点模板显式指定的 UA (如移动端) 优先，不被覆盖。
pub struct SessionMiddleware;

#[async_trait::async_trait]
impl Middleware for SessionMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        if let Some(session) = extensions.get::<Arc<Session>>() {
            let headers = req.headers_mut();

            let ua = session.get_ua();
            if !ua.is_empty()
                && !headers.contains_key(USER_AGENT)
                && let Ok(val) = HeaderValue::from_str(&ua)
            {
                headers.insert(USER_AGENT, val);
            }

            if let Some(cookie) = session.get_cookie()
                && !cookie.is_empty()
                && let Ok(val) = HeaderValue::from_str(&cookie)
            {
                headers.insert(COOKIE, val);
            }
        }

        debug!(url = %req.url(), "发送请求");
        next.run(req, extensions).await
    }
}
