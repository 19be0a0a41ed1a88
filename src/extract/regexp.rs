//! 正则提取：每条表达式恰好一个捕获组，只看第一处匹配。

use regex::Regex;

use crate::error::{PortalError, PortalResult};

/// 编译并校验提取用正则。
///
/// `captures_len()` 包含隐式的第 0 组，因此“恰好一个捕获组”对应长度 2。
pub fn compile_pattern(pattern: &str) -> PortalResult<Regex> {
    let regex = Regex::new(pattern)
        .map_err(|e| PortalError::config(format!("正则表达式无效 `{}`：{}", pattern, e)))?;

    let groups = regex.captures_len() - 1;
    if groups != 1 {
        return Err(PortalError::config(format!(
            "正则表达式 `{}` 必须恰好包含 1 个捕获组（当前 {} 个）",
            pattern, groups
        )));
    }

    Ok(regex)
}

/// 取第一处匹配的第 1 组文本。
pub fn capture_first(regex: &Regex, text: &str) -> PortalResult<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PortalError::NotFound {
            path: regex.as_str().to_string(),
            state: format!("正文 {} 字节内无匹配", text.len()),
        })
}
