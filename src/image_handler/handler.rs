//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageResolver` 把图片处理拆成两段，对应抓取周期中的两个时间点：
//! 1. `locate`：JSON 仍然存活时，读出图片地址与原图尺寸，得到自包含的 `ImageRequest`；
//! 2. `resolve`：JSON 释放之后，计算放置位置 → （可选）构造转换地址 → 下载 → 本地缩放。
//!
//! ## 实现思路
//!
//! - 构造时完成全部校验（尺寸为 0、转换服务缺少账户等），周期内只会出现 `ImageError`。
//! - 记录 `download/resize/total` 阶段耗时，便于性能诊断。

use std::time::Instant;

use serde_json::Value;

use super::config::ImageConfig;
use super::converter::conversion_url;
use super::downloader::Downloader;
use super::pipeline::resize_in_place;
use super::placement::place;
use super::source::{ImageRequest, ImageSource, ResolvedImage};
use super::ImageError;
use crate::config::Secrets;
use crate::error::{PortalError, PortalResult};
use crate::extract::{JsonPath, traverse};
use crate::network::redact_url_for_log;

/// 转换服务账户。
#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    key: String,
}

/// 图片解析器。
pub struct ImageResolver {
    config: ImageConfig,
    target: (u32, u32),
    downloader: Box<dyn Downloader>,
    credentials: Option<Credentials>,
}

impl ImageResolver {
    /// 根据配置创建解析器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::time::Duration;
    /// use portal_feed::config::Secrets;
    /// use portal_feed::image_handler::{HttpDownloader, ImageConfig, ImageResolver, ImageSource};
    ///
    /// let config = ImageConfig::new(ImageSource::Url("https://example.com/a.png".into()));
    /// let downloader = HttpDownloader::new(Duration::from_secs(30))?;
    /// let resolver = ImageResolver::new(config, (320, 240), Box::new(downloader), &Secrets::default())?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        config: ImageConfig,
        display_size: (u32, u32),
        downloader: Box<dyn Downloader>,
        secrets: &Secrets,
    ) -> PortalResult<Self> {
        config.validate(display_size)?;

        let credentials = match &config.conversion {
            Some(_) => {
                let (username, key) = secrets.credentials().ok_or_else(|| {
                    PortalError::config("图片转换服务需要 secrets 中的 aio_username 与 aio_key")
                })?;
                Some(Credentials {
                    username: username.to_string(),
                    key: key.to_string(),
                })
            }
            None => None,
        };

        Ok(Self {
            target: config.target_size(display_size),
            config,
            downloader,
            credentials,
        })
    }

    pub fn needs_json(&self) -> bool {
        self.config.needs_json()
    }

    /// 在 JSON 释放前定位图片。
    ///
    /// 地址为空字符串时返回 `Ok(None)`，本轮不处理图片。
    pub fn locate(&self, json: Option<&Value>) -> Result<Option<ImageRequest>, ImageError> {
        let url = match &self.config.source {
            ImageSource::Url(url) => url.clone(),
            ImageSource::JsonPath(path) => {
                let value = lookup(json, path)?;
                value
                    .as_str()
                    .ok_or_else(|| ImageError::NotFound(format!("图片地址 {} 不是字符串", path)))?
                    .to_string()
            }
        };

        if url.is_empty() {
            return Ok(None);
        }

        let original_size = match &self.config.dimension_paths {
            Some(paths) => {
                let width = dimension(lookup(json, &paths.width)?, &paths.width)?;
                let height = dimension(lookup(json, &paths.height)?, &paths.height)?;
                log::debug!("原图尺寸：{}x{}", width, height);
                Some((width, height))
            }
            None => None,
        };

        Ok(Some(ImageRequest { url, original_size }))
    }

    /// 下载、（可选）缩放并计算显示位置。
    pub fn resolve(&self, request: &ImageRequest) -> Result<ResolvedImage, ImageError> {
        let started = Instant::now();
        let placement = place(self.target, self.config.position, request.original_size);

        let download_url = match (&self.config.conversion, &self.credentials) {
            (Some(service), Some(credentials)) => conversion_url(
                service,
                &credentials.username,
                &credentials.key,
                &request.url,
                placement.width,
                placement.height,
            )?,
            _ => request.url.clone(),
        };

        log::info!(
            "🖼️ 解析图片 - 原始地址: {} 下载地址: {}",
            redact_url_for_log(&request.url),
            redact_url_for_log(&download_url)
        );

        let path = self.config.cache_path.clone();
        self.downloader.download(&download_url, &path)?;
        let download_ms = started.elapsed().as_millis();

        let resize_started = Instant::now();
        if self.config.conversion.is_none() {
            resize_in_place(&path, self.target, self.config.max_decoded_pixels)?;
        }
        let resize_ms = resize_started.elapsed().as_millis();

        log::info!(
            "✅ 图片就绪 - {} @ {:?}（download={}ms, resize={}ms, total={}ms）",
            path.display(),
            placement.position,
            download_ms,
            resize_ms,
            started.elapsed().as_millis()
        );

        Ok(ResolvedImage {
            path,
            position: placement.position,
        })
    }
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("config", &self.config)
            .field("target", &self.target)
            .field("conversion", &self.credentials.is_some())
            .finish()
    }
}

fn lookup<'a>(json: Option<&'a Value>, path: &JsonPath) -> Result<&'a Value, ImageError> {
    let root = json.ok_or_else(|| ImageError::NotFound("响应不是 JSON".to_string()))?;
    traverse(root, path).map_err(|e| ImageError::NotFound(e.to_string()))
}

/// 尺寸可以是数字或数字字符串。
fn dimension(value: &Value, path: &JsonPath) -> Result<u32, ImageError> {
    let parsed = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
        }
        _ => None,
    };

    parsed
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ImageError::InvalidFormat(format!("尺寸 {} 不是数字：{}", path, value)))
}
