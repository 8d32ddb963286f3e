use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use crate::core::config::NetworkConfig;
use crate::core::error::{CrawlError, Result};
use crate::interfaces::fetch::{FetchResponse, HttpFetch};
use crate::network::middleware::SessionMiddleware;
use crate::network::session::Session;

/// 基于 reqwest 的 HTTP 服务
#[derive(Clone)]
pub struct HttpService {
    client: ClientWithMiddleware,
    session: Arc<Session>,
}

impl HttpService {
    pub fn new(config: &NetworkConfig, session: Arc<Session>) -> Result<Self> {
        let client = Self::try_build_internal_client(config)?;
        Ok(Self { client, session })
    }

    /// 构建底层的 HTTP 客户端
    fn try_build_internal_client(config: &NetworkConfig) -> Result<ClientWithMiddleware> {
        let mut headers = HeaderMap::new();

        // 基础浏览器 Header，端点模板可逐请求覆盖
        let base_headers = [
            (
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            (ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8"),
            (REFERER, "https://weibo.com/"),
            (ORIGIN, "https://weibo.com"),
        ];
        headers.extend(
            base_headers
                .into_iter()
                .map(|(k, v)| (k, HeaderValue::from_static(v))),
        );

        let mut client_builder = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout());

        if let Some(proxy) = config.proxy.as_deref() {
            client_builder =
                client_builder.proxy(reqwest::Proxy::all(proxy).map_err(CrawlError::Network)?);
        }

        let client = client_builder.build().map_err(CrawlError::Network)?;

        Ok(ClientBuilder::new(client).with(SessionMiddleware).build())
    }
}

#[async_trait]
impl HttpFetch for HttpService {
    async fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<FetchResponse> {
        let resp = self
            .client
            .get(url)
            .headers(headers.clone())
            .timeout(timeout)
            .with_extension(self.session.clone())
            .send()
            .await
            .map_err(CrawlError::Middleware)?;

        let status = resp.status().as_u16();
        let resp_headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(CrawlError::Network)?;
        Ok(FetchResponse::new(status, resp_headers, body))
    }
}
