//! # JSON 路径遍历
//!
//! ## 设计思路
//!
//! 路径由“键 / 下标”有序片段组成，逐段下钻。
//! 任意一段未命中立即返回 `NotFound`，并附带：
//! - 截止到失败片段（含）的部分路径；
//! - 失败时所处结构的有界文本快照（避免把整个大响应写进错误消息）。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PortalError, PortalResult};

/// 错误消息中结构快照的最大字符数。
const STATE_SNAPSHOT_MAX_CHARS: usize = 160;

/// 单个路径片段：对象键或数组下标。
///
/// 配置文件里直接写 `["bpi", "USD", "rate_float"]` 或 `[0, "text"]`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "[{}]", index),
            Self::Key(key) => write!(f, "[{:?}]", key),
        }
    }
}

/// 有序 JSON 路径。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPath(pub Vec<PathSegment>);

impl JsonPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for segment in &self.0 {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// 沿路径逐段下钻，返回命中的节点引用。
///
/// 字符串键作用于数组、下标作用于对象、或作用于标量，均视为未命中。
pub fn traverse<'a>(root: &'a Value, path: &JsonPath) -> PortalResult<&'a Value> {
    let mut current = root;

    for (depth, segment) in path.segments().iter().enumerate() {
        let next = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        };

        current = match next {
            Some(value) => value,
            None => {
                let partial = JsonPath(path.segments()[..=depth].to_vec());
                return Err(PortalError::NotFound {
                    path: partial.to_string(),
                    state: snapshot(current),
                });
            }
        };
    }

    Ok(current)
}

/// 结构快照：超长时按字符截断并加省略号。
fn snapshot(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= STATE_SNAPSHOT_MAX_CHARS {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(STATE_SNAPSHOT_MAX_CHARS).collect();
    truncated.push('…');
    truncated
}
