//! # 数据提取模块（extract）
//!
//! ## 设计思路
//!
//! JSON 路径与正则两种提取方式互斥，用带标签的枚举 `Extraction` 在构造时一次选定，
//! 而不是两个彼此独立、都可能为空的字段。
//!
//! - `json_path`：逐段遍历 JSON 结构
//! - `regexp`：单捕获组、首个匹配
//!
//! ## 实现思路
//!
//! 每条路径要么产出一个值，要么整体返回 `NotFound`，绝不返回部分填充的结果。

pub mod json_path;
pub mod regexp;

use std::fmt;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PortalError, PortalResult};

pub use json_path::{JsonPath, PathSegment, traverse};

/// 配置文件中的提取声明。
///
/// ```json
/// { "extraction": { "json_path": [["title"], ["date"]] } }
/// { "extraction": { "regex": [">([0-9]+ online)<"] } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionConfig {
    /// 不提取，整段正文作为唯一值。
    #[default]
    None,
    JsonPath(Vec<JsonPath>),
    Regex(Vec<String>),
}

/// 已校验、已编译的提取方式。
#[derive(Debug, Clone)]
pub enum Extraction {
    None,
    JsonPath(Vec<JsonPath>),
    Regex(Vec<Regex>),
}

impl Extraction {
    /// 从配置构建，正则在此处编译并校验捕获组数量。
    ///
    /// 空的路径或正则列表视为配置错误。
    pub fn from_config(config: &ExtractionConfig) -> PortalResult<Self> {
        Ok(match config {
            ExtractionConfig::None => Self::None,
            ExtractionConfig::JsonPath(paths) if paths.is_empty() => {
                return Err(PortalError::config("JSON 路径列表为空"));
            }
            ExtractionConfig::Regex(patterns) if patterns.is_empty() => {
                return Err(PortalError::config("正则列表为空"));
            }
            ExtractionConfig::JsonPath(paths) => Self::JsonPath(paths.clone()),
            ExtractionConfig::Regex(patterns) => Self::Regex(
                patterns
                    .iter()
                    .map(|p| regexp::compile_pattern(p))
                    .collect::<PortalResult<Vec<_>>>()?,
            ),
        })
    }

    /// 是否需要把正文解析为 JSON。
    pub fn needs_json(&self) -> bool {
        matches!(self, Self::JsonPath(_))
    }

    /// 本次提取将产出的值个数。
    pub fn value_count(&self) -> usize {
        match self {
            Self::None => 1,
            Self::JsonPath(paths) => paths.len(),
            Self::Regex(patterns) => patterns.len(),
        }
    }

    /// 执行提取。
    ///
    /// `json` 仅在 JSON 模式下使用；调用方保证此时已完成解析。
    pub fn extract(&self, body: &str, json: Option<&Value>) -> PortalResult<Vec<ExtractedValue>> {
        match self {
            Self::None => Ok(vec![ExtractedValue::Text(body.to_string())]),
            Self::JsonPath(paths) => {
                static NULL: Value = Value::Null;
                let root = json.unwrap_or(&NULL);
                paths
                    .iter()
                    .map(|path| traverse(root, path).map(ExtractedValue::from_json))
                    .collect()
            }
            Self::Regex(patterns) => patterns
                .iter()
                .map(|regex| regexp::capture_first(regex, body).map(ExtractedValue::Text))
                .collect(),
        }
    }
}

/// 提取出的值，每轮周期重建。
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedValue {
    Text(String),
    Number(serde_json::Number),
    /// 布尔、null 或路径落在容器节点上
    Other(Value),
}

impl ExtractedValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text.clone()),
            Value::Number(number) => Self::Number(number.clone()),
            other => Self::Other(other.clone()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.as_f64(),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for ExtractedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{}", number),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for ExtractedValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
