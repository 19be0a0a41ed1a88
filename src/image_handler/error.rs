//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片链路中的所有错误来源，避免字符串拼接式错误处理。
//! 图片错误在抓取周期内可恢复：编排器捕获后回退到默认背景，不中止本轮周期。

/// 图片处理统一错误类型。
///
/// 会经 `#[from]` 上转为 `PortalError::Image`。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    /// 实际写入字节数与 Content-Length 不符
    #[error("下载不完整：期望 {expected} 字节，实际 {received} 字节")]
    Incomplete { expected: u64, received: u64 },

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    /// 像素数超过上限
    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// JSON 中找不到图片地址或尺寸
    #[error("图片信息缺失：{0}")]
    NotFound(String),
}
