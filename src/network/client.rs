//! 基于 `reqwest::blocking` 的默认网络客户端。

use std::collections::BTreeMap;
use std::time::Duration;

use super::{HttpResponse, NetworkClient, redact_url_for_log};
use crate::error::{PortalError, PortalResult};

const USER_AGENT: &str = concat!("portal-feed/", env!("CARGO_PKG_VERSION"));

/// 阻塞式 HTTP 客户端，连接池在实例内复用。
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> PortalResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PortalError::transport(format!("初始化 HTTP 客户端失败：{}", e)))?;
        Ok(Self { client })
    }

    fn map_reqwest_error(e: reqwest::Error, url: &str, timeout: Duration) -> PortalError {
        let err_msg = e.to_string().replace(url, &redact_url_for_log(url));

        if e.is_timeout() {
            PortalError::transport(format!("请求超时（{}ms）", timeout.as_millis()))
        } else if e.is_connect() {
            PortalError::transport(format!("无法连接：{}", err_msg))
        } else {
            PortalError::transport(format!("请求失败：{}", err_msg))
        }
    }
}

impl NetworkClient for ReqwestClient {
    fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> PortalResult<HttpResponse> {
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .map_err(|e| Self::map_reqwest_error(e, url, timeout))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| Self::map_reqwest_error(e, url, timeout))?;

        log::debug!("响应 HTTP {}，{} 字节", status, text.len());
        Ok(HttpResponse { status, text })
    }
}
