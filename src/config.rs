//! # 配置模块
//!
//! ## 设计思路
//!
//! 所有构造期参数集中在 `PortalConfig`，从一个 JSON 文件反序列化。
//! 每个字段都有默认值，最小配置只需 `{"url": "..."}`。
//! 配置只在 `PortalBuilder::build` 时被校验一次，抓取周期内不会再出现配置错误。
//!
//! ```json
//! {
//!   "url": "https://api.example.com/quote.json",
//!   "extraction": { "json_path": [[0, "text"], [0, "author"]] },
//!   "text": [
//!     { "position": [20, 60], "wrap": 28, "max_len": 180 },
//!     { "position": [20, 200], "color": 16777215 }
//!   ],
//!   "secrets": { "aio_username": "me", "aio_key": "..." }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::display::{Background, Caption};
use crate::error::{PortalError, PortalResult};
use crate::extract::ExtractionConfig;
use crate::image_handler::ImageConfig;
use crate::network::{DEFAULT_LOCAL_FILE, DEFAULT_TIMEOUT};
use crate::text::TextSlotConfig;

/// 远程服务账户与时区。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Secrets {
    pub aio_username: Option<String>,
    pub aio_key: Option<String>,
    pub timezone: Option<String>,
}

impl Secrets {
    /// 账户名与密钥都存在时返回二者。
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.aio_username, &self.aio_key) {
            (Some(username), Some(key)) => Some((username.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// 门户配置。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// 数据地址；未配置时必须存在本地兜底文件
    pub url: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: u64,
    pub extraction: ExtractionConfig,
    pub default_background: Background,
    /// 每个提取值对应一个文本槽位，按顺序匹配
    pub text: Vec<TextSlotConfig>,
    pub caption: Option<Caption>,
    pub image: Option<ImageConfig>,
    pub secrets: Secrets,
    /// 本地兜底文件，构造时存在即永久离线
    pub local_file: PathBuf,
    /// 命令行运行器的抓取间隔（秒）
    pub fetch_interval_secs: u64,
    /// 无屏幕渲染器使用的逻辑尺寸
    pub display_size: (u32, u32),
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            url: None,
            headers: BTreeMap::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            extraction: ExtractionConfig::None,
            default_background: Background::default(),
            text: Vec::new(),
            caption: None,
            image: None,
            secrets: Secrets::default(),
            local_file: PathBuf::from(DEFAULT_LOCAL_FILE),
            fetch_interval_secs: 60,
            display_size: (320, 240),
        }
    }
}

impl PortalConfig {
    /// 从 JSON 文件读取配置。
    pub fn load(path: impl AsRef<Path>) -> PortalResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PortalError::config(format!("读取配置文件 {} 失败：{}", path.display(), e))
        })?;

        Self::from_json(&content)
            .map_err(|e| PortalError::config(format!("解析配置文件 {} 失败：{}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }
}
