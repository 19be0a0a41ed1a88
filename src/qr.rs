//! # 二维码模块
//!
//! ## 设计思路
//!
//! 符号矩阵的生成被视为黑盒能力（`SymbolEncoder`），默认由 `qrcode` crate 提供。
//! 本模块只负责：
//! 1. 分配比矩阵大一圈（宽高各 +2）的单色位图，边框全部为白（0）；
//! 2. 把矩阵单元 (x, y) 抄写到位图 (x + 1, y + 1)，深色为 1、浅色为 0；
//! 3. 包装成带位置、缩放与显示模式的覆盖层。
//!
//! 显示模式是一个显式的二态标志：
//! - `Exclusive`：只显示二维码，清除时恢复完整的先前画面；
//! - `Incremental`：叠加在现有画面上，清除时只移除二维码。

use qrcode::{Color, QrCode};

use crate::display::Position;
use crate::error::{PortalError, PortalResult};

/// 调色板：0 → 白，1 → 黑。
pub const QR_PALETTE: [u32; 2] = [0xFFFFFF, 0x000000];

/// 布尔符号矩阵，按行存储。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    width: usize,
    height: usize,
    modules: Vec<bool>,
}

impl SymbolMatrix {
    /// 从按行展开的模块数组构建；长度与尺寸不符时返回 `None`。
    pub fn from_modules(width: usize, height: usize, modules: Vec<bool>) -> Option<Self> {
        if width.checked_mul(height)? != modules.len() {
            return None;
        }
        Some(Self { width, height, modules })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }
}

/// 符号矩阵生成能力。
pub trait SymbolEncoder {
    fn encode(&self, payload: &[u8]) -> PortalResult<SymbolMatrix>;
}

/// 基于 `qrcode` crate 的默认实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct QrCodeEncoder;

impl SymbolEncoder for QrCodeEncoder {
    fn encode(&self, payload: &[u8]) -> PortalResult<SymbolMatrix> {
        let code = QrCode::new(payload).map_err(|e| PortalError::Qr(e.to_string()))?;
        let width = code.width();
        let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();

        SymbolMatrix::from_modules(width, width, modules)
            .ok_or_else(|| PortalError::Qr("符号矩阵尺寸异常".to_string()))
    }
}

/// 带一格白边的单色位图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrBitmap {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl QrBitmap {
    pub fn from_matrix(matrix: &SymbolMatrix) -> Self {
        let width = matrix.width() + 2;
        let height = matrix.height() + 2;
        let mut cells = vec![0u8; width * height];

        for y in 0..matrix.height() {
            for x in 0..matrix.width() {
                cells[(y + 1) * width + (x + 1)] = u8::from(matrix.is_dark(x, y));
            }
        }

        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 取单元值：0 浅色，1 深色。
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

/// 二维码显示模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    /// 只显示二维码，直到显式清除
    Exclusive,
    /// 叠加在现有图层之上
    #[default]
    Incremental,
}

/// 二维码显示参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    pub scale: u32,
    pub position: Position,
    pub mode: OverlayMode,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            scale: 1,
            position: (0, 0),
            mode: OverlayMode::Incremental,
        }
    }
}

/// 定位、缩放后的二维码覆盖层。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrOverlay {
    pub bitmap: QrBitmap,
    pub scale: u32,
    pub position: Position,
    pub mode: OverlayMode,
    pub palette: [u32; 2],
}

/// 二维码编码器。
pub struct QrEncoder {
    encoder: Box<dyn SymbolEncoder>,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new(Box::new(QrCodeEncoder))
    }
}

impl QrEncoder {
    pub fn new(encoder: Box<dyn SymbolEncoder>) -> Self {
        Self { encoder }
    }

    /// 生成覆盖层。
    ///
    /// # 示例
    /// ```rust
    /// use portal_feed::qr::{QrEncoder, QrOptions};
    ///
    /// let overlay = QrEncoder::default().encode(b"https://example.com", QrOptions::default())?;
    /// assert_eq!(overlay.bitmap.get(0, 0), 0);
    /// # Ok::<(), portal_feed::PortalError>(())
    /// ```
    pub fn encode(&self, payload: &[u8], options: QrOptions) -> PortalResult<QrOverlay> {
        if options.scale == 0 {
            return Err(PortalError::Qr("缩放倍数必须大于 0".to_string()));
        }

        let matrix = self.encoder.encode(payload)?;
        let bitmap = QrBitmap::from_matrix(&matrix);

        Ok(QrOverlay {
            bitmap,
            scale: options.scale,
            position: options.position,
            mode: options.mode,
            palette: QR_PALETTE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn border_is_light(bitmap: &QrBitmap) -> bool {
        let (w, h) = (bitmap.width(), bitmap.height());
        (0..w).all(|x| bitmap.get(x, 0) == 0 && bitmap.get(x, h - 1) == 0)
            && (0..h).all(|y| bitmap.get(0, y) == 0 && bitmap.get(w - 1, y) == 0)
    }

    #[test]
    fn transcribes_cells_with_offset() {
        let matrix = SymbolMatrix::from_modules(2, 2, vec![true, false, false, true]).expect("valid");
        let bitmap = QrBitmap::from_matrix(&matrix);

        assert_eq!((bitmap.width(), bitmap.height()), (4, 4));
        assert_eq!(bitmap.get(1, 1), 1);
        assert_eq!(bitmap.get(2, 1), 0);
        assert_eq!(bitmap.get(1, 2), 0);
        assert_eq!(bitmap.get(2, 2), 1);
        assert!(border_is_light(&bitmap));
    }

    #[test]
    fn default_encoder_produces_version_sized_symbol() {
        let overlay = QrEncoder::default()
            .encode(b"hello", QrOptions { scale: 3, position: (10, 20), mode: OverlayMode::Exclusive })
            .expect("encode should succeed");

        // 版本 1 为 21x21
        assert_eq!(overlay.bitmap.width(), 23);
        assert_eq!(overlay.bitmap.height(), 23);
        assert_eq!(overlay.scale, 3);
        assert_eq!(overlay.position, (10, 20));
        assert_eq!(overlay.mode, OverlayMode::Exclusive);
        assert_eq!(overlay.palette, QR_PALETTE);
        assert!(border_is_light(&overlay.bitmap));
        // 左上角定位图案的外框为深色
        assert_eq!(overlay.bitmap.get(1, 1), 1);
    }

    #[test]
    fn zero_scale_is_rejected() {
        let result = QrEncoder::default()
            .encode(b"x", QrOptions { scale: 0, ..QrOptions::default() });
        assert!(matches!(result, Err(PortalError::Qr(_))));
    }

    #[test]
    fn mismatched_module_count_is_rejected() {
        assert!(SymbolMatrix::from_modules(3, 3, vec![true; 8]).is_none());
    }

    proptest! {
        #[test]
        fn bitmap_is_matrix_plus_border(
            (w, h, modules) in (1usize..40, 1usize..40)
                .prop_flat_map(|(w, h)| (Just(w), Just(h), proptest::collection::vec(any::<bool>(), w * h)))
        ) {
            let matrix = SymbolMatrix::from_modules(w, h, modules).expect("sizes match");
            let bitmap = QrBitmap::from_matrix(&matrix);

            prop_assert_eq!(bitmap.width(), w + 2);
            prop_assert_eq!(bitmap.height(), h + 2);
            prop_assert!(border_is_light(&bitmap));
            for y in 0..h {
                for x in 0..w {
                    prop_assert_eq!(bitmap.get(x + 1, y + 1), u8::from(matrix.is_dark(x, y)));
                }
            }
        }
    }
}
