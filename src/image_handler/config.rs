//! # 配置模块
//!
//! ## 设计思路
//!
//! 将图片链路的所有可调项集中到 `ImageConfig`，在构造阶段一次校验，
//! 抓取周期内只读。
//!
//! ```json
//! {
//!   "image": {
//!     "source": { "json_path": [0, "image"] },
//!     "dimension_paths": { "width": [0, "w"], "height": [0, "h"] },
//!     "resize": [320, 240],
//!     "position": [0, 0],
//!     "conversion": { "color_depth": 16 }
//!   }
//! }
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use super::source::ImageSource;
use crate::display::Position;
use crate::error::{PortalError, PortalResult};
use crate::extract::JsonPath;

/// 默认缓存文件（单槽位，每轮覆盖）。
pub const DEFAULT_CACHE_PATH: &str = "cache.bmp";

/// 默认像素上限（约 160 MB RGBA）。
pub const DEFAULT_MAX_DECODED_PIXELS: u64 = 40_000_000;

/// 远程转换服务地址模板，`{username}` 会被替换为账户名。
pub const DEFAULT_CONVERTER_ENDPOINT: &str =
    "https://io.adafruit.com/api/v2/{username}/integrations/image-formatter";

/// 图片处理配置。
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub source: ImageSource,
    /// 原图宽高在 JSON 中的路径
    #[serde(default)]
    pub dimension_paths: Option<DimensionPaths>,
    /// 目标尺寸，缺省为屏幕尺寸
    #[serde(default)]
    pub resize: Option<(u32, u32)>,
    #[serde(default)]
    pub position: Position,
    /// 远程转换服务；配置后跳过本地缩放
    #[serde(default)]
    pub conversion: Option<ConversionService>,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    /// 图片下载超时（秒）
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    /// 本地缩放时原图与输出允许的最大像素数
    #[serde(default = "default_max_decoded_pixels")]
    pub max_decoded_pixels: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DimensionPaths {
    pub width: JsonPath,
    pub height: JsonPath,
}

/// 远程图片转换服务。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversionService {
    #[serde(default = "default_converter_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_color_depth")]
    pub color_depth: u8,
}

impl Default for ConversionService {
    fn default() -> Self {
        Self {
            endpoint: default_converter_endpoint(),
            color_depth: default_color_depth(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

fn default_download_timeout_secs() -> u64 {
    30
}

fn default_max_decoded_pixels() -> u64 {
    DEFAULT_MAX_DECODED_PIXELS
}

fn default_converter_endpoint() -> String {
    DEFAULT_CONVERTER_ENDPOINT.to_string()
}

fn default_color_depth() -> u8 {
    16
}

impl ImageConfig {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            dimension_paths: None,
            resize: None,
            position: (0, 0),
            conversion: None,
            cache_path: default_cache_path(),
            download_timeout_secs: default_download_timeout_secs(),
            max_decoded_pixels: default_max_decoded_pixels(),
        }
    }

    /// 定位图片是否需要解析后的 JSON。
    pub fn needs_json(&self) -> bool {
        self.source.needs_json() || self.dimension_paths.is_some()
    }

    /// 目标尺寸：显式配置优先，否则使用屏幕尺寸。
    pub fn target_size(&self, display_size: (u32, u32)) -> (u32, u32) {
        self.resize.unwrap_or(display_size)
    }

    /// 构造阶段校验。
    pub fn validate(&self, display_size: (u32, u32)) -> PortalResult<()> {
        let (width, height) = self.target_size(display_size);
        if width == 0 || height == 0 {
            return Err(PortalError::config(format!(
                "图片目标尺寸不能为 0：{}x{}",
                width, height
            )));
        }
        if self.max_decoded_pixels == 0 {
            return Err(PortalError::config("像素上限不能为 0"));
        }
        if let Some(conversion) = &self.conversion {
            if !matches!(conversion.color_depth, 1 | 4 | 8 | 16 | 24 | 32) {
                return Err(PortalError::config(format!(
                    "不支持的色深：{}",
                    conversion.color_depth
                )));
            }
        }
        Ok(())
    }
}
