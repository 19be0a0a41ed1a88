//! # 数据门户命令行运行器
//!
//! 读取配置文件，以无屏幕渲染器运行抓取循环：
//! 每轮失败只记录日志，等待固定间隔后重试。
//!
//! ```text
//! portal-feed [config.json]
//! ```

use std::process::ExitCode;

use portal_feed::display::HeadlessDisplay;
use portal_feed::{FetchOutcome, Portal, PortalConfig};

const DEFAULT_CONFIG_PATH: &str = "portal.json";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match PortalConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("启动失败：{err}");
            return ExitCode::FAILURE;
        }
    };

    let interval = config.fetch_interval();
    let (width, height) = config.display_size;
    log::info!("setup: 配置 {} 已加载，抓取间隔 {}s", config_path, interval.as_secs());

    let mut portal = match Portal::builder(config, Box::new(HeadlessDisplay::new(width, height))).build() {
        Ok(portal) => portal,
        Err(err) => {
            log::error!("启动失败：{err}");
            return ExitCode::FAILURE;
        }
    };

    if portal.is_offline() {
        log::info!("setup: 离线模式，仅读取本地文件");
    }

    loop {
        match portal.fetch(None, None) {
            Ok(FetchOutcome::Single(value)) => log::info!("值：{value}"),
            Ok(FetchOutcome::Many(values)) => {
                for (index, value) in values.iter().enumerate() {
                    log::info!("值[{index}]：{value}");
                }
            }
            // fetch 内部已记录错误详情
            Err(err) => log::warn!("⚠️ 本轮跳过（{}），{}s 后重试", err.kind(), interval.as_secs()),
        }

        std::thread::sleep(interval);
    }
}
