//! # 文本格式化模块（text）
//!
//! ## 设计思路
//!
//! 每个“文本槽位”对应一个提取值，负责把值变成可直接交给渲染器的行列表：
//!
//! ```text
//! ExtractedValue
//!    ↓ 自定义变换（若有）/ 否则千分位分组 → 回退原文
//!    ↓ 按词换行（wrap > 0 时）
//!    ↓ 按字符截断（max_len > 0 时）
//! RenderText { lines, color, position }
//! ```

pub mod format;
pub mod wrap;

use serde::Deserialize;

use crate::display::{Position, RenderText};
use crate::extract::ExtractedValue;

pub use format::{default_format, group_thousands, truncate_chars};
pub use wrap::wrap;

/// 默认文字颜色（灰）。
pub const DEFAULT_TEXT_COLOR: u32 = 0x808080;

/// 自定义文本变换：替代默认的数值格式化。
pub type TextTransform = Box<dyn Fn(&ExtractedValue) -> String>;

/// 配置文件中的文本槽位声明。
#[derive(Debug, Clone, Deserialize)]
pub struct TextSlotConfig {
    pub position: Position,
    #[serde(default = "default_text_color")]
    pub color: u32,
    /// 每行最大字符数，0 表示不换行
    #[serde(default)]
    pub wrap: usize,
    /// 最大字符数，0 表示不截断
    #[serde(default)]
    pub max_len: usize,
}

fn default_text_color() -> u32 {
    DEFAULT_TEXT_COLOR
}

/// 运行时文本槽位。
pub struct TextSlot {
    pub position: Position,
    pub color: u32,
    pub wrap: usize,
    pub max_len: usize,
    transform: Option<TextTransform>,
}

impl TextSlot {
    pub fn from_config(config: &TextSlotConfig) -> Self {
        Self {
            position: config.position,
            color: config.color,
            wrap: config.wrap,
            max_len: config.max_len,
            transform: None,
        }
    }

    pub fn set_transform(&mut self, transform: TextTransform) {
        self.transform = Some(transform);
    }

    /// 完整格式化链路：变换 / 默认格式 → 换行 → 截断。
    pub fn format(&self, value: &ExtractedValue) -> RenderText {
        let formatted = match &self.transform {
            Some(transform) => transform(value),
            None => default_format(value),
        };

        let text = if self.wrap > 0 {
            log::debug!("文本换行，宽度 {}", self.wrap);
            wrap(&formatted, self.wrap).join("\n")
        } else {
            formatted
        };

        self.layout(&text)
    }

    /// 仅做截断与分行，用于直接设置文本。
    pub fn layout(&self, text: &str) -> RenderText {
        let truncated = truncate_chars(text, self.max_len);
        RenderText {
            lines: truncated.split('\n').map(str::to_string).collect(),
            color: self.color,
            position: self.position,
        }
    }
}

impl std::fmt::Debug for TextSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSlot")
            .field("position", &self.position)
            .field("color", &self.color)
            .field("wrap", &self.wrap)
            .field("max_len", &self.max_len)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}
