//! 端点回退驱动 (Endpoint Fallback Driver)
//!
//! 按顺序尝试端点列表，第一个产出结果的端点胜出。
//! 传输失败、策略拒绝、提取失败都只是切换到下一个端点，同一端点不重试。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::error::{CrawlError, Result};
use crate::interfaces::{EndpointAttempt, FetchResponse, HttpFetch, PolicyResult, ResponsePolicy};

/// 调试模式下记录的响应体预览长度
const DEBUG_PREVIEW_CHARS: usize = 500;

pub struct FallbackDriver {
    fetcher: Arc<dyn HttpFetch>,
    policies: Vec<Arc<dyn ResponsePolicy>>,
    timeout: Duration,
    delay: Duration,
    debug: bool,
}

impl FallbackDriver {
    pub fn new(
        fetcher: Arc<dyn HttpFetch>,
        policies: Vec<Arc<dyn ResponsePolicy>>,
        timeout: Duration,
        delay: Duration,
        debug: bool,
    ) -> Self {
        Self {
            fetcher,
            policies,
            timeout,
            delay,
            debug,
        }
    }

    /// 依次执行端点尝试，`extract` 把通过策略检查的响应转换为结果
    pub async fn run<T, F, Fut>(&self, attempts: Vec<EndpointAttempt>, extract: F) -> Result<T>
    where
        F: Fn(String, FetchResponse) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let total = attempts.len();

        for attempt in attempts {
            info!(index = attempt.index, endpoint = attempt.name, url = %attempt.url, "尝试端点");

            match self.try_one(&attempt, &extract).await {
                Ok(value) => {
                    info!(index = attempt.index, endpoint = attempt.name, "端点解析成功");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(
                        index = attempt.index,
                        endpoint = attempt.name,
                        url = %attempt.url,
                        kind = e.kind(),
                        "端点失败: {}", e
                    );
                }
            }

            if attempt.index < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        Err(CrawlError::EndpointsExhausted(total))
    }

    async fn try_one<T, F, Fut>(&self, attempt: &EndpointAttempt, extract: &F) -> Result<T>
    where
        F: Fn(String, FetchResponse) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let resp = self
            .fetcher
            .get(&attempt.url, &attempt.headers, self.timeout)
            .await?;

        if self.debug {
            self.log_diagnostics(attempt, &resp);
        }

        for policy in &self.policies {
            if let PolicyResult::Deny(reason) = policy.check(&resp) {
                debug!(policy = policy.name(), reason = %reason, "响应被策略拒绝");
                return Err(CrawlError::AccessDenied(reason));
            }
        }

        extract(attempt.url.clone(), resp).await
    }

    fn log_diagnostics(&self, attempt: &EndpointAttempt, resp: &FetchResponse) {
        let text = resp.text();
        let preview = crate::utils::truncate_chars(&text, DEBUG_PREVIEW_CHARS);
        debug!(
            index = attempt.index,
            url = %attempt.url,
            status = resp.status,
            content_type = resp.content_type().unwrap_or("unknown"),
            headers = ?resp.headers,
            body_len = resp.body.len(),
            "端点响应诊断\n{}",
            preview
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::header::HeaderMap;

    use super::*;
    use crate::core::config::NetworkConfig;
    use crate::network::policies::default_policies;
    use crate::sites::weibo::endpoints::plan;

    /// 内存中的 HTTP 桩，按 URL 返回预设响应，并记录请求顺序
    #[derive(Default)]
    pub struct FakeFetch {
        pub routes: HashMap<String, (u16, String)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeFetch {
        pub fn route(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes.insert(url.to_string(), (status, body.to_string()));
            self
        }
    }

    #[async_trait]
    impl HttpFetch for FakeFetch {
        async fn get(&self, url: &str, _headers: &HeaderMap, _timeout: Duration) -> Result<FetchResponse> {
            self.calls.lock().push(url.to_string());
            match self.routes.get(url) {
                Some((status, body)) => Ok(FetchResponse::new(*status, HeaderMap::new(), body.clone())),
                None => Err(CrawlError::Transport(format!("connection refused: {url}"))),
            }
        }
    }

    fn driver(fake: Arc<FakeFetch>) -> FallbackDriver {
        paced_driver(fake, Duration::ZERO)
    }

    fn paced_driver(fake: Arc<FakeFetch>, delay: Duration) -> FallbackDriver {
        FallbackDriver::new(fake, default_policies(), Duration::from_secs(1), delay, true)
    }

    #[tokio::test]
    async fn advances_past_denied_and_failed_endpoints() {
        let fake = Arc::new(
            FakeFetch::default()
                .route("https://weibo.com/ttarticle/x/m/aj/detail?id=7", 200, "请登录")
                .route("https://m.weibo.cn/statuses/extend?id=7", 500, "")
                .route("https://weibo.com/ajax/statuses/longtext?id=7", 200, "not useful")
                .route("https://card.weibo.com/article/m/show/id/7", 200, "good"),
        );
        let attempts = plan("7", &NetworkConfig::default());

        let result = driver(fake.clone())
            .run(attempts, |url, resp| async move {
                if resp.text() == "good" {
                    Ok(url)
                } else {
                    Err(CrawlError::ExtractionFailed("no".into()))
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "https://card.weibo.com/article/m/show/id/7");
        assert_eq!(fake.calls.lock().len(), 4);
    }

    #[tokio::test]
    async fn exhausts_all_endpoints() {
        let fake = Arc::new(FakeFetch::default());
        let attempts = plan("8", &NetworkConfig::default());

        let err = driver(fake.clone())
            .run(attempts, |_url, _resp| async { Ok::<_, CrawlError>(()) })
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::EndpointsExhausted(6)));
        assert_eq!(fake.calls.lock().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_failed_endpoints() {
        let fake = Arc::new(
            FakeFetch::default().route("https://m.weibo.cn/statuses/extend?id=9", 200, "good"),
        );
        let attempts = plan("9", &NetworkConfig::default());

        let started = tokio::time::Instant::now();
        let result = paced_driver(fake.clone(), Duration::from_secs(1))
            .run(attempts, |url, _resp| async move { Ok::<_, CrawlError>(url) })
            .await
            .unwrap();

        assert_eq!(result, "https://m.weibo.cn/statuses/extend?id=9");
        assert_eq!(fake.calls.lock().len(), 2);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_after_last_endpoint() {
        let fake = Arc::new(FakeFetch::default());
        let attempts = plan("10", &NetworkConfig::default());

        let started = tokio::time::Instant::now();
        let err = paced_driver(fake, Duration::from_secs(1))
            .run(attempts, |_url, _resp| async { Ok::<_, CrawlError>(()) })
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::EndpointsExhausted(6)));
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }
}
