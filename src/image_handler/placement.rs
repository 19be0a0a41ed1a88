//! 目标尺寸与显示位置计算。
//!
//! 竖图（原宽 < 原高）按目标高度裁出一块更窄的区域，并水平居中；
//! 其余情况原样使用目标尺寸与位置。

use crate::display::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// 请求转换服务时使用的宽度
    pub width: u32,
    pub height: u32,
    pub position: Position,
}

pub fn place(target: (u32, u32), position: Position, original: Option<(u32, u32)>) -> Placement {
    let (target_w, target_h) = target;

    match original {
        Some((orig_w, orig_h)) if orig_w < orig_h => {
            let cropped_w = (u64::from(target_h) * u64::from(target_h) / u64::from(target_w)) as u32;
            // 整数除法向零截断
            let offset = (i64::from(target_w) - i64::from(cropped_w)) / 2;
            Placement {
                width: cropped_w,
                height: target_h,
                position: (position.0 + offset as i32, position.1),
            }
        }
        _ => Placement {
            width: target_w,
            height: target_h,
            position,
        },
    }
}
