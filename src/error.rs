//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `PortalError` 枚举，覆盖一次抓取周期中所有可能的失败来源：
//! 传输、解析、数据变换、路径提取、图片、配置。
//!
//! 调用方据此区分“致命”与“可恢复”：
//! - `Transport` / `Parse` / `Transform` / `NotFound` 直接中止本轮周期并原样上抛；
//! - `Image` 在编排器内部被捕获，回退到默认背景后继续；
//! - `Config` 只会在构造阶段出现，绝不会出现在周期中途。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` 提供 `From` 转换，无需手动 map。
//! - `kind()` 输出稳定错误码，便于日志检索。

use crate::image_handler::ImageError;

/// 用户数据变换函数返回的错误类型。
///
/// 保持为装箱的 trait object，编排器不做任何改写，原样透传给调用方。
pub type TransformFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 流水线统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// 数据获取失败（连接失败、超时、非 2xx 状态、本地文件不可读）
    #[error("数据获取失败：{0}")]
    Transport(String),

    /// 响应体不是合法 JSON，`raw` 保留原始文本便于排查
    #[error("响应解析失败：{message}")]
    Parse { message: String, raw: String },

    /// 第 `index` 个用户变换函数报错
    #[error("数据变换失败（第 {index} 个变换）：{source}")]
    Transform {
        index: usize,
        #[source]
        source: TransformFailure,
    },

    /// 提取路径或正则未命中
    #[error("未找到数据：{path}（当前结构：{state}）")]
    NotFound { path: String, state: String },

    /// 图片链路错误（下载 / 转换 / 缩放），在抓取周期内可恢复
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 配置矛盾或缺失，仅在构造阶段抛出
    #[error("配置错误：{0}")]
    Config(String),

    /// 二维码生成失败（载荷过长等）
    #[error("二维码生成失败：{0}")]
    Qr(String),
}

/// 流水线结果别名。
pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    /// 稳定错误码，用于日志与上层分支判断。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Parse { .. } => "parse",
            Self::Transform { .. } => "transform",
            Self::NotFound { .. } => "not_found",
            Self::Image(_) => "image",
            Self::Config(_) => "config",
            Self::Qr(_) => "qr",
        }
    }

    /// 是否会中止整个抓取周期。
    pub fn aborts_cycle(&self) -> bool {
        !matches!(self, Self::Image(_))
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
