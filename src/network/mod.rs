//! # 数据获取模块（network）
//!
//! ## 设计思路
//!
//! 抓取周期的第一步只关心“拿到一段正文”，来源有两种：
//! - `client`：通过 `NetworkClient` 发起一次阻塞 GET（默认实现基于 `reqwest::blocking`）；
//! - `local`：本地兜底文件，一旦在构造时发现它存在，实例永久离线。
//!
//! 两者都产出 `HttpResponse`，编排器不区分来源。
//!
//! ## 实现思路
//!
//! - `NetworkClient` 作为 trait 注入，测试中可替换为计数 / 模拟实现。
//! - 日志中的 URL 一律经过 `redact_url_for_log`，避免泄露 query 中的密钥。

pub mod client;
pub mod local;

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use crate::error::{PortalError, PortalResult};

pub use client::ReqwestClient;
pub use local::{LocalFileSource, DEFAULT_LOCAL_FILE};

/// 默认请求超时。
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// 一次获取得到的响应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub text: String,
}

impl HttpResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { status: 200, text: text.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 按 JSON 解析正文，失败时保留原文。
    pub fn json(&self) -> PortalResult<Value> {
        serde_json::from_str(&self.text).map_err(|e| PortalError::Parse {
            message: e.to_string(),
            raw: self.text.clone(),
        })
    }
}

/// 阻塞式 HTTP GET 能力。
pub trait NetworkClient {
    fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> PortalResult<HttpResponse>;
}

/// 日志用 URL：去掉 query 与 fragment。
pub fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
    let path = parsed.path();

    format!("{}://{}{}{}", parsed.scheme(), host, port, path)
}

/// HTTP 状态码的简短说明。
pub fn status_message(code: u16) -> &'static str {
    match code {
        404 => "未找到",
        401 | 403 => "访问被拒绝",
        429 => "请求过于频繁",
        500..=599 => "服务器错误",
        _ => "请求失败",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_url_for_log_removes_query_and_fragment() {
        let redacted = redact_url_for_log(
            "https://io.example.com:8443/api/v2/me/time?x-aio-key=secret#frag",
        );
        assert_eq!(redacted, "https://io.example.com:8443/api/v2/me/time");
        assert_eq!(redact_url_for_log("not a url"), "<invalid-url>");
    }

    #[test]
    fn malformed_json_keeps_raw_text() {
        let response = HttpResponse::ok("<html>oops</html>");
        match response.json() {
            Err(PortalError::Parse { raw, .. }) => assert_eq!(raw, "<html>oops</html>"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse { status: 204, text: String::new() }.is_success());
        assert!(!HttpResponse { status: 301, text: String::new() }.is_success());
        assert!(!HttpResponse { status: 404, text: String::new() }.is_success());
    }
}
