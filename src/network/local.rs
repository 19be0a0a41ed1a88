//! 本地兜底文件。
//!
//! 构造时若发现文件存在，实例即进入永久离线模式：之后每轮周期都只读取该文件，
//! 不再发起任何网络请求。

use std::path::{Path, PathBuf};

use super::HttpResponse;
use crate::error::{PortalError, PortalResult};

/// 默认兜底文件名。
pub const DEFAULT_LOCAL_FILE: &str = "local.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 文件存在时返回数据源，否则 `None`。
    pub fn detect(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        path.is_file().then(|| Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 同步读取完整 UTF-8 文本。
    pub fn read(&self) -> PortalResult<HttpResponse> {
        log::info!("📁 读取本地文件：{}", self.path.display());

        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            PortalError::transport(format!("无法读取本地文件 {}：{}", self.path.display(), e))
        })?;

        Ok(HttpResponse::ok(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("portal_local_{}", unique));
        std::fs::create_dir_all(&dir).expect("create temp dir failed");
        dir
    }

    #[test]
    fn detect_requires_existing_file() {
        let dir = temp_dir();
        let path = dir.join(DEFAULT_LOCAL_FILE);

        assert!(LocalFileSource::detect(&path).is_none());

        std::fs::write(&path, r#"{"title": "offline"}"#).expect("write failed");
        let source = LocalFileSource::detect(&path).expect("file should be detected");
        let response = source.read().expect("read should succeed");

        assert_eq!(response.status, 200);
        assert_eq!(response.text, r#"{"title": "offline"}"#);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unreadable_file_is_transport_error() {
        let source = LocalFileSource::new(temp_dir().join("gone.txt"));
        assert!(matches!(source.read(), Err(PortalError::Transport(_))));
    }
}
