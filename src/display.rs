//! # 显示与状态能力接口
//!
//! ## 设计思路
//!
//! 合成器、背光、状态灯等都属于外部协作方，核心流水线只依赖这里的 trait：
//! - `DisplayRenderer`：分层的显示 / 替换操作（背景、文本、标题、二维码）与刷新；
//! - `StatusIndicator`：流水线阶段的颜色提示，失败不影响核心逻辑，因此签名不返回错误。
//!
//! `HeadlessDisplay` 是一个只记录图层状态并打日志的实现，
//! 供无屏幕环境下的命令行运行器与测试使用。

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;

use crate::qr::QrOverlay;

/// 屏幕坐标（左上角为原点）。
pub type Position = (i32, i32);

/// 刷新时的目标帧率。
pub const TARGET_FRAMES_PER_SECOND: u32 = 60;

/// 背景图层内容。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// 纯色填充（0xRRGGBB）
    Color(u32),
    /// 位图文件，放置在指定位置
    File {
        path: PathBuf,
        #[serde(default)]
        position: Position,
    },
    /// 不显示背景
    None,
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(0x000000)
    }
}

/// 交给渲染器的文本块。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderText {
    pub lines: Vec<String>,
    pub color: u32,
    pub position: Position,
}

impl RenderText {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// 固定标题（不随数据变化）。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Caption {
    #[serde(default)]
    pub text: String,
    pub position: Position,
    #[serde(default = "default_caption_color")]
    pub color: u32,
}

fn default_caption_color() -> u32 {
    0x808080
}

/// 分层渲染器。
///
/// 图层自底向上：背景 → 标题 → 文本 → 二维码。
pub trait DisplayRenderer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// 替换背景图层。
    fn set_background(&mut self, background: &Background);
    /// 创建或替换第 `index` 个文本块。
    fn set_text(&mut self, index: usize, text: &RenderText);
    /// 创建或替换标题。
    fn set_caption(&mut self, caption: &Caption);
    /// 放入二维码，替换二维码图层中已有的内容。
    fn show_qr(&mut self, overlay: &QrOverlay);
    /// 移除二维码图层内容，其余图层不动。
    fn clear_qr(&mut self);
    /// 只显示二维码图层。
    fn show_only_qr(&mut self);
    /// 恢复显示全部图层。
    fn show_all(&mut self);
    fn refresh(&mut self, target_fps: u32);
}

/// 流水线阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    Idle,
    Fetching,
    Success,
    Error,
}

impl StatusPhase {
    /// 状态灯颜色（RGB）。
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Self::Idle => (0, 0, 0),
            Self::Fetching => (100, 100, 0),
            Self::Success => (0, 0, 100),
            Self::Error => (100, 0, 0),
        }
    }
}

/// 状态指示灯。
pub trait StatusIndicator {
    fn set_status(&mut self, phase: StatusPhase);
}

/// 共享句柄：调用方保留一份 `Rc`，在门户运行期间观察渲染状态。
impl<T: DisplayRenderer> DisplayRenderer for Rc<RefCell<T>> {
    fn width(&self) -> u32 {
        self.borrow().width()
    }

    fn height(&self) -> u32 {
        self.borrow().height()
    }

    fn set_background(&mut self, background: &Background) {
        self.borrow_mut().set_background(background);
    }

    fn set_text(&mut self, index: usize, text: &RenderText) {
        self.borrow_mut().set_text(index, text);
    }

    fn set_caption(&mut self, caption: &Caption) {
        self.borrow_mut().set_caption(caption);
    }

    fn show_qr(&mut self, overlay: &QrOverlay) {
        self.borrow_mut().show_qr(overlay);
    }

    fn clear_qr(&mut self) {
        self.borrow_mut().clear_qr();
    }

    fn show_only_qr(&mut self) {
        self.borrow_mut().show_only_qr();
    }

    fn show_all(&mut self) {
        self.borrow_mut().show_all();
    }

    fn refresh(&mut self, target_fps: u32) {
        self.borrow_mut().refresh(target_fps);
    }
}

impl<T: StatusIndicator> StatusIndicator for Rc<RefCell<T>> {
    fn set_status(&mut self, phase: StatusPhase) {
        self.borrow_mut().set_status(phase);
    }
}

/// 记录全部阶段变化的状态灯，供无硬件环境使用。
#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    pub phases: Vec<StatusPhase>,
}

impl StatusIndicator for StatusLog {
    fn set_status(&mut self, phase: StatusPhase) {
        log::debug!("状态灯：{:?} {:?}", phase, phase.color());
        self.phases.push(phase);
    }
}

/// 无屏幕渲染器：记录图层状态并输出日志。
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    width: u32,
    height: u32,
    pub background: Option<Background>,
    pub texts: Vec<Option<RenderText>>,
    pub caption: Option<Caption>,
    pub qr: Option<QrOverlay>,
    pub qr_only: bool,
    pub refreshes: u32,
}

impl HeadlessDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: None,
            texts: Vec::new(),
            caption: None,
            qr: None,
            qr_only: false,
            refreshes: 0,
        }
    }

    pub fn text(&self, index: usize) -> Option<&RenderText> {
        self.texts.get(index).and_then(Option::as_ref)
    }
}

impl DisplayRenderer for HeadlessDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_background(&mut self, background: &Background) {
        log::info!("🖼️ 背景：{:?}", background);
        self.background = Some(background.clone());
    }

    fn set_text(&mut self, index: usize, text: &RenderText) {
        log::info!("📝 文本[{}] @ {:?}：{}", index, text.position, text.text());
        if self.texts.len() <= index {
            self.texts.resize(index + 1, None);
        }
        self.texts[index] = Some(text.clone());
    }

    fn set_caption(&mut self, caption: &Caption) {
        log::info!("🏷️ 标题：{}", caption.text);
        self.caption = Some(caption.clone());
    }

    fn show_qr(&mut self, overlay: &QrOverlay) {
        log::info!(
            "🔳 二维码 {}x{} @ {:?} scale={}",
            overlay.bitmap.width(),
            overlay.bitmap.height(),
            overlay.position,
            overlay.scale
        );
        self.qr = Some(overlay.clone());
    }

    fn clear_qr(&mut self) {
        self.qr = None;
    }

    fn show_only_qr(&mut self) {
        self.qr_only = true;
    }

    fn show_all(&mut self) {
        self.qr_only = false;
    }

    fn refresh(&mut self, target_fps: u32) {
        log::debug!("刷新显示（目标 {} fps）", target_fps);
        self.refreshes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_deserializes_file_or_color() {
        let bg: Background = serde_json::from_str(r#"{"color": 16777215}"#).expect("valid");
        assert_eq!(bg, Background::Color(0xFFFFFF));

        let bg: Background =
            serde_json::from_str(r#"{"file": {"path": "bg.bmp"}}"#).expect("valid");
        assert_eq!(bg, Background::File { path: PathBuf::from("bg.bmp"), position: (0, 0) });
    }

    #[test]
    fn headless_display_grows_text_slots() {
        let mut display = HeadlessDisplay::new(320, 240);
        let text = RenderText { lines: vec!["hi".into()], color: 0, position: (1, 2) };

        display.set_text(2, &text);

        assert!(display.text(0).is_none());
        assert_eq!(display.text(2), Some(&text));
    }

    #[test]
    fn shared_handle_forwards_to_inner_display() {
        let shared = Rc::new(RefCell::new(HeadlessDisplay::new(320, 240)));
        let mut handle: Box<dyn DisplayRenderer> = Box::new(Rc::clone(&shared));

        handle.set_background(&Background::Color(0x112233));
        handle.refresh(TARGET_FRAMES_PER_SECOND);

        assert_eq!(handle.width(), 320);
        assert_eq!(shared.borrow().background, Some(Background::Color(0x112233)));
        assert_eq!(shared.borrow().refreshes, 1);
    }

    #[test]
    fn status_colors_match_phases() {
        assert_eq!(StatusPhase::Fetching.color(), (100, 100, 0));
        assert_eq!(StatusPhase::Success.color(), (0, 0, 100));
        assert_eq!(StatusPhase::Idle.color(), (0, 0, 0));
    }
}
