//! 默认数值格式化与截断。
//!
//! 回退顺序固定：先尝试按整数加千分位，失败再原样输出文本。

use crate::extract::ExtractedValue;

/// 尝试把值格式化为带千分位的整数。
///
/// - JSON 整数直接分组；浮点数先向零截断，超出 `i128` 范围时按十进制展开后分组；
/// - 文本去掉首尾空白后能解析为整数才分组（`"12.5"`、`"42 online"` 不算）；
/// - 布尔、null、容器一律返回 `None`。
pub fn group_thousands(value: &ExtractedValue) -> Option<String> {
    let integer: i128 = match value {
        ExtractedValue::Number(number) => {
            if let Some(i) = number.as_i64() {
                i as i128
            } else if let Some(u) = number.as_u64() {
                u as i128
            } else {
                let f = number.as_f64()?;
                if !f.is_finite() {
                    return None;
                }
                if f.abs() >= i128::MAX as f64 {
                    let digits = format!("{:.0}", f.trunc().abs());
                    return Some(group_digits(f < 0.0, &digits));
                }
                f.trunc() as i128
            }
        }
        ExtractedValue::Text(text) => text.trim().parse::<i128>().ok()?,
        ExtractedValue::Other(_) => return None,
    };

    Some(format_grouped(integer))
}

/// 默认格式化：能分组就分组，否则原样。
pub fn default_format(value: &ExtractedValue) -> String {
    group_thousands(value).unwrap_or_else(|| value.to_string())
}

fn format_grouped(value: i128) -> String {
    group_digits(value < 0, &value.unsigned_abs().to_string())
}

fn group_digits(negative: bool, digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// 按字符截断，`max_len == 0` 表示不限制。
pub fn truncate_chars(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return text.to_string();
    }
    text.chars().take(max_len).collect()
}
