//! # 中间数据模型
//!
//! 图片来源声明，以及在 JSON 仍然存活时提前定位出的下载请求。

use serde::Deserialize;

use crate::display::Position;
use crate::extract::JsonPath;

/// 图片地址来源。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// 固定地址
    Url(String),
    /// 每轮从响应 JSON 中读取
    JsonPath(JsonPath),
}

impl ImageSource {
    pub fn needs_json(&self) -> bool {
        matches!(self, Self::JsonPath(_))
    }
}

/// 已定位的图片请求：释放 JSON 之后仍可独立完成下载与缩放。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub url: String,
    /// 原图宽高（若 JSON 中提供）
    pub original_size: Option<(u32, u32)>,
}

/// 本轮图片处理结果：缓存文件位置与显示坐标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub path: std::path::PathBuf,
    pub position: Position,
}
