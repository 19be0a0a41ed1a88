//! # 时间服务模块
//!
//! ## 设计思路
//!
//! 设备没有可靠的实时时钟，通过远程 strftime 接口获取某地的本地时间。
//! 接口需要账户名与密钥做限流；`secrets.timezone` 优先于调用方传入的地点，
//! 两者都没有时由服务端按 IP 推断。
//!
//! ## 实现思路
//!
//! - 地址构造与 `image_handler::converter` 一致：账户名进路径，其余参数 URL 编码进 query。
//! - 响应形如 `2024-03-09 14:05:33.120 069 6 +0000 UTC`，用预编译正则切分后交给 chrono。

use std::time::Duration;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Secrets;
use crate::error::{PortalError, PortalResult};
use crate::network::{NetworkClient, redact_url_for_log, status_message};

/// 时间服务地址模板，`{username}` 会被替换为账户名。
pub const DEFAULT_TIME_ENDPOINT: &str =
    "https://io.adafruit.com/api/v2/{username}/integrations/time/strftime";

/// 请求的输出格式：日期 时间.毫秒 年内第几天 星期 时区偏移 时区名。
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%L %j %u %z %Z";

const TIME_TIMEOUT: Duration = Duration::from_secs(10);

static TIME_REPLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}) (\d{2}:\d{2}:\d{2})(?:\.\d+)? (\d{1,3}) (\d)")
        .expect("时间响应正则为合法字面量")
});

/// 远端返回的本地时间。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub datetime: NaiveDateTime,
    /// 年内第几天（1 起）
    pub year_day: u32,
    /// 星期（1 = 周一 … 7 = 周日）
    pub week_day: u32,
}

/// 构造时间服务地址。
pub fn time_service_url(
    endpoint: &str,
    username: &str,
    key: &str,
    location: Option<&str>,
) -> PortalResult<String> {
    let mut url = reqwest::Url::parse(&endpoint.replace("{username}", username))
        .map_err(|e| PortalError::config(format!("时间服务地址无效：{}", e)))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("x-aio-key", key);
        if let Some(location) = location {
            query.append_pair("tz", location);
        }
        query.append_pair("fmt", TIME_FORMAT);
    }

    Ok(url.into())
}

/// 解析时间服务响应。
pub fn parse_time_reply(text: &str) -> PortalResult<LocalTime> {
    let malformed = |message: String| PortalError::Parse {
        message,
        raw: text.to_string(),
    };

    let caps = TIME_REPLY_RE
        .captures(text.trim())
        .ok_or_else(|| malformed("时间响应格式不符".to_string()))?;

    let datetime = NaiveDateTime::parse_from_str(
        &format!("{} {}", &caps[1], &caps[2]),
        "%Y-%m-%d %H:%M:%S",
    )
    .map_err(|e| malformed(format!("时间字段无效：{}", e)))?;

    let year_day: u32 = caps[3]
        .parse()
        .map_err(|_| malformed("年内天数无效".to_string()))?;
    let week_day: u32 = caps[4]
        .parse()
        .map_err(|_| malformed("星期无效".to_string()))?;

    Ok(LocalTime {
        datetime,
        year_day,
        week_day,
    })
}

/// 时间服务客户端。
#[derive(Debug, Clone)]
pub struct TimeService {
    endpoint: String,
}

impl Default for TimeService {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_ENDPOINT)
    }
}

impl TimeService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    /// 查询本地时间。
    ///
    /// 缺少账户信息时返回 `Config` 错误，非 2xx 返回 `Transport`，响应格式不符返回 `Parse`。
    pub fn local_time(
        &self,
        client: &dyn NetworkClient,
        secrets: &Secrets,
        location: Option<&str>,
    ) -> PortalResult<LocalTime> {
        let (username, key) = secrets.credentials().ok_or_else(|| {
            PortalError::config("时间服务需要 secrets 中的 aio_username 与 aio_key")
        })?;

        let location = secrets.timezone.as_deref().or(location);
        match location {
            Some(location) => log::info!("🕐 获取时区 {} 的时间", location),
            None => log::info!("🕐 按 IP 地址获取时间"),
        }

        let url = time_service_url(&self.endpoint, username, key, location)?;
        log::debug!("时间请求：{}", redact_url_for_log(&url));

        let response = client.get(&url, &Default::default(), TIME_TIMEOUT)?;
        if !response.is_success() {
            return Err(PortalError::transport(format!(
                "时间服务 HTTP {}: {}（{}）",
                response.status,
                status_message(response.status),
                response.text.trim()
            )));
        }
        log::debug!("时间响应：{}", response.text.trim());

        let local_time = parse_time_reply(&response.text)?;
        log::info!("✅ 当前时间：{}", local_time.datetime);
        Ok(local_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::HttpResponse;
    use chrono::{Datelike, Timelike};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    struct CannedClient {
        response: HttpResponse,
        urls: RefCell<Vec<String>>,
    }

    impl NetworkClient for CannedClient {
        fn get(&self, url: &str, _: &BTreeMap<String, String>, _: Duration) -> PortalResult<HttpResponse> {
            self.urls.borrow_mut().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    fn secrets(timezone: Option<&str>) -> Secrets {
        Secrets {
            aio_username: Some("maker".into()),
            aio_key: Some("k3y".into()),
            timezone: timezone.map(str::to_string),
        }
    }

    #[test]
    fn parses_strftime_reply() {
        let time = parse_time_reply("2024-03-09 14:05:33.120 069 6 +0000 UTC\n").expect("valid reply");

        assert_eq!(time.datetime.year(), 2024);
        assert_eq!(time.datetime.month(), 3);
        assert_eq!(time.datetime.day(), 9);
        assert_eq!(time.datetime.hour(), 14);
        assert_eq!(time.datetime.second(), 33);
        assert_eq!(time.year_day, 69);
        assert_eq!(time.week_day, 6);
    }

    #[test]
    fn malformed_reply_is_parse_error() {
        assert!(matches!(
            parse_time_reply("Unknown timezone"),
            Err(PortalError::Parse { raw, .. }) if raw == "Unknown timezone"
        ));
        assert!(matches!(
            parse_time_reply("2024-13-40 99:00:00.000 1 1"),
            Err(PortalError::Parse { .. })
        ));
    }

    #[test]
    fn url_carries_encoded_timezone_and_format() {
        let url = time_service_url(DEFAULT_TIME_ENDPOINT, "maker", "k3y", Some("America/New_York"))
            .expect("valid endpoint");

        assert!(url.starts_with("https://io.adafruit.com/api/v2/maker/integrations/time/strftime?"));
        assert!(url.contains("x-aio-key=k3y"));
        assert!(url.contains("tz=America%2FNew_York"));
        assert!(url.contains("fmt=%25Y-%25m-%25d+%25H%3A%25M%3A%25S.%25L+%25j+%25u+%25z+%25Z"));
    }

    #[test]
    fn secrets_timezone_overrides_argument() {
        let client = CannedClient {
            response: HttpResponse::ok("2024-01-01 00:00:00.000 001 1 +0100 CET"),
            urls: RefCell::new(Vec::new()),
        };

        TimeService::default()
            .local_time(&client, &secrets(Some("Europe/Paris")), Some("Tokyo"))
            .expect("should succeed");

        let urls = client.urls.borrow();
        assert!(urls[0].contains("tz=Europe%2FParis"));
        assert!(!urls[0].contains("Tokyo"));
    }

    #[test]
    fn no_location_lets_service_use_ip() {
        let client = CannedClient {
            response: HttpResponse::ok("2024-01-01 00:00:00.000 001 1 +0000 UTC"),
            urls: RefCell::new(Vec::new()),
        };

        TimeService::default()
            .local_time(&client, &secrets(None), None)
            .expect("should succeed");
        assert!(!client.urls.borrow()[0].contains("tz="));
    }

    #[test]
    fn missing_secrets_is_config_error() {
        let client = CannedClient {
            response: HttpResponse::ok(""),
            urls: RefCell::new(Vec::new()),
        };

        let result = TimeService::default().local_time(&client, &Secrets::default(), Some("UTC"));
        assert!(matches!(result, Err(PortalError::Config(_))));
        assert!(client.urls.borrow().is_empty());
    }

    #[test]
    fn error_status_is_transport_error() {
        let client = CannedClient {
            response: HttpResponse { status: 400, text: "bad tz".into() },
            urls: RefCell::new(Vec::new()),
        };

        let result = TimeService::default().local_time(&client, &secrets(None), Some("Nowhere"));
        assert!(matches!(result, Err(PortalError::Transport(_))));
    }
}
