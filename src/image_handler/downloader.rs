//! # 下载模块
//!
//! ## 设计思路
//!
//! 把图片流式写入单一缓存槽位，并尽可能早地失败：
//! 状态码不对、文件签名不是图片、字节数与 Content-Length 不符都会立即报错。
//!
//! ## 实现思路
//!
//! - 阻塞读取响应体，按块写入文件，不在内存中保留整张图片；
//! - 首批字节累积到足以识别签名时用 `infer` 校验一次；
//! - 结束后比对实际写入字节数与 Content-Length。

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use super::ImageError;
use crate::network::{redact_url_for_log, status_message};

const CHUNK_SIZE: usize = 12_000;
const SIGNATURE_PROBE_BYTES: usize = 4096;

/// 图片下载能力。
pub trait Downloader {
    /// 下载到 `dest`，返回写入的字节数。
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ImageError>;
}

/// 基于 `reqwest::blocking` 的默认实现。
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<Self, ImageError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::Network(format!("初始化下载客户端失败：{}", e)))?;
        Ok(Self { client, timeout })
    }

    fn map_reqwest_error(&self, e: reqwest::Error, url: &str) -> ImageError {
        let err_msg = e.to_string().replace(url, &redact_url_for_log(url));

        if e.is_timeout() {
            ImageError::Timeout(format!("下载超时（{}秒）", self.timeout.as_secs()))
        } else if e.is_connect() {
            ImageError::Network(format!("无法连接：{}", err_msg))
        } else {
            ImageError::Network(format!("请求失败：{}", err_msg))
        }
    }

    fn map_read_error(e: std::io::Error) -> ImageError {
        if e.kind() == std::io::ErrorKind::TimedOut {
            ImageError::Timeout("下载数据流读取超时".to_string())
        } else {
            ImageError::Network(format!("下载失败：{}", e))
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ImageError> {
        let started = Instant::now();
        log::info!("🌐 开始下载图片 - URL: {}", redact_url_for_log(url));

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.map_reqwest_error(e, url))?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            return Err(ImageError::Network(format!("HTTP {}: {}", code, status_message(code))));
        }

        let expected_len = response.content_length();
        let file = File::create(dest)
            .map_err(|e| ImageError::FileSystem(format!("无法创建 {}：{}", dest.display(), e)))?;
        let mut writer = BufWriter::new(file);

        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut probe: Vec<u8> = Vec::with_capacity(SIGNATURE_PROBE_BYTES);
        let mut signature_validated = false;
        let mut total: u64 = 0;

        loop {
            let n = response.read(&mut chunk).map_err(Self::map_read_error)?;
            if n == 0 {
                break;
            }

            if !signature_validated {
                let take = n.min(SIGNATURE_PROBE_BYTES.saturating_sub(probe.len()));
                probe.extend_from_slice(&chunk[..take]);
                signature_validated = validate_stream_signature_probe(&probe, SIGNATURE_PROBE_BYTES)?;
            }

            writer
                .write_all(&chunk[..n])
                .map_err(|e| ImageError::FileSystem(format!("写入缓存失败：{}", e)))?;
            total += n as u64;
        }

        writer
            .flush()
            .map_err(|e| ImageError::FileSystem(format!("写入缓存失败：{}", e)))?;

        if !signature_validated {
            validate_image_signature(&probe)?;
        }

        if let Some(expected) = expected_len {
            if expected != total {
                return Err(ImageError::Incomplete { expected, received: total });
            }
        }

        log::debug!(
            "✅ 下载完成 - {} bytes，耗时 {}ms",
            total,
            started.elapsed().as_millis()
        );
        Ok(total)
    }
}

/// 完整校验：内容必须非空且签名为图片。
pub(crate) fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(ImageError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}

/// 流式探测：识别出图片返回 `true`，字节不足返回 `false`，识别为其它类型则报错。
fn validate_stream_signature_probe(bytes: &[u8], probe_limit: usize) -> Result<bool, ImageError> {
    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }
        return Ok(true);
    }

    if bytes.len() >= probe_limit {
        return Err(ImageError::InvalidFormat("无法识别图片类型".to_string()));
    }

    Ok(false)
}
