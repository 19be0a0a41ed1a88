//! # 数据门户库入口
//!
//! 面向单板联网显示设备的“获取 → 变换 → 渲染”流水线。
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 外部协作方（驱动 / 硬件）                  │
//! │                                                          │
//! │  DisplayRenderer ── StatusIndicator ── NetworkClient     │
//! │        ↑                  ↑                ↑             │
//! └────────┼──────────────────┼────────────────┼─────────────┘
//!          │       capability traits           │
//! ┌────────┼──────────────────┼────────────────┼─────────────┐
//! │        │            核心 (Rust)            │             │
//! │                                                          │
//! │  ┌─ portal ─────── Portal::fetch 一轮完整周期              │
//! │  │   ├─ network         本地文件 / 阻塞 GET               │
//! │  │   ├─ transform       用户 JSON 变换链                  │
//! │  │   ├─ extract         JSON 路径 / 正则提取               │
//! │  │   ├─ image_handler   定位·转换·下载·缩放               │
//! │  │   └─ text            格式化·换行·截断                  │
//! │  │                                                       │
//! │  ├─ qr ─────────── 二维码位图与显示模式                    │
//! │  ├─ time_service ─ 远程本地时间                           │
//! │  ├─ config ─────── PortalConfig / Secrets (JSON)          │
//! │  └─ error ──────── PortalError (统一错误类型)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`portal`] | 编排抓取周期、错误传播、回调、二维码与背景等直接操作 |
//! | [`network`] | `NetworkClient` 能力、`reqwest` 默认实现、本地兜底文件 |
//! | [`transform`] | 有序的 JSON 变换链，首个失败即中止 |
//! | [`extract`] | JSON 路径遍历与单捕获组正则，两种模式互斥 |
//! | [`image_handler`] | 图片定位、竖图居中、远程转换、流式下载、等比缩放 |
//! | [`text`] | 千分位分组、按词换行、按字符截断 |
//! | [`qr`] | 带白边的单色二维码位图 |
//! | [`display`] | 分层渲染器与状态灯能力接口，以及无屏幕实现 |
//! | [`time_service`] | 按时区或 IP 获取本地时间 |
//! | [`config`] | 构造期配置与账户信息 |
//! | [`error`] | 统一错误类型 `PortalError` |

pub mod config;
pub mod display;
pub mod error;
pub mod extract;
pub mod image_handler;
pub mod network;
pub mod portal;
pub mod qr;
pub mod text;
pub mod time_service;
pub mod transform;

pub use config::{PortalConfig, Secrets};
pub use error::{PortalError, PortalResult};
pub use extract::ExtractedValue;
pub use portal::{FetchOutcome, Portal, PortalBuilder};
