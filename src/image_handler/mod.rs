//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“定位 → 放置计算 → （可选）远程转换 → 下载 → 本地缩放”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线
//! - `placement`：竖图裁切宽度与居中偏移
//! - `converter`：远程转换服务地址
//! - `downloader`：流式下载与签名校验
//! - `pipeline`：解码、等比缩放、写回缓存
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! Portal::fetch
//!    ↓（JSON 存活）
//! handler.rs::locate（图片地址 + 原图尺寸）
//!    ↓（JSON 已释放）
//! handler.rs::resolve
//!    ├─ placement.rs（目标尺寸 / 位置）
//!    ├─ converter.rs（转换服务地址，可选）
//!    ├─ downloader.rs（写入 cache.bmp）
//!    └─ pipeline.rs（本地缩放，未配置转换服务时）
//!    ↓
//! ResolvedImage → 设置背景；任何 ImageError → 回退默认背景
//! ```

mod config;
mod converter;
mod downloader;
mod error;
mod handler;
mod pipeline;
mod placement;
mod source;

pub use config::{
    ConversionService, DEFAULT_CACHE_PATH, DEFAULT_CONVERTER_ENDPOINT, DEFAULT_MAX_DECODED_PIXELS,
    DimensionPaths, ImageConfig,
};
pub use converter::conversion_url;
pub use downloader::{Downloader, HttpDownloader};
pub use error::ImageError;
pub use handler::ImageResolver;
pub use pipeline::{
    ScaleAxis, resize_in_place, scale_axis, scaled_dimensions, validate_pixel_limits,
};
pub use placement::{Placement, place};
pub use source::{ImageRequest, ImageSource, ResolvedImage};
