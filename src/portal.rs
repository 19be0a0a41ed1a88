//! # 门户编排模块（portal）
//!
//! ## 设计思路
//!
//! `Portal` 只负责流程编排：一次 `fetch` 就是一轮完整的
//! “获取 → 解析 → 变换 → 提取 → 图片 → 回调 → 文本”周期。
//! 所有外部能力（网络、下载、显示、状态灯）都通过 `PortalBuilder` 注入。
//!
//! 错误分两类：
//! - 获取 / 解析 / 变换 / 提取失败直接中止本轮，原样返回；
//! - 图片失败在周期内被吞掉，回退默认背景后继续渲染文本。
//!
//! ## 实现思路
//!
//! - 构造阶段完成全部配置校验，周期中不会出现 `Config` 错误。
//! - 图片地址在 JSON 存活时定位，然后先释放正文与 JSON 再下载图片，控制峰值内存。
//! - 记录 `acquire/extract/image/text/total` 阶段耗时，便于性能诊断。
//!
//! ## 新同事快速上手
//!
//! ```text
//! Portal::fetch
//!    ├─ network（本地文件 / 阻塞 GET）
//!    ├─ HttpResponse::json（按需）
//!    ├─ transform（用户变换链）
//!    ├─ extract（JSON 路径 / 正则）
//!    ├─ image_handler::locate → 释放 JSON → resolve
//!    ├─ on_success 回调
//!    └─ text 槽位格式化 → DisplayRenderer::set_text
//! ```

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::config::{PortalConfig, Secrets};
use crate::display::{
    Background, Caption, DisplayRenderer, StatusIndicator, StatusPhase, TARGET_FRAMES_PER_SECOND,
};
use crate::error::{PortalError, PortalResult, TransformFailure};
use crate::extract::{ExtractedValue, Extraction};
use crate::image_handler::{Downloader, HttpDownloader, ImageError, ImageRequest, ImageResolver};
use crate::network::{
    LocalFileSource, NetworkClient, ReqwestClient, redact_url_for_log, status_message,
};
use crate::qr::{OverlayMode, QrEncoder, QrOptions};
use crate::text::{TextSlot, TextTransform};
use crate::time_service::{LocalTime, TimeService};
use crate::transform::TransformChain;

/// 抓取成功回调，拿到本轮全部提取值。
pub type SuccessCallback = Box<dyn FnMut(&[ExtractedValue])>;

/// 一轮抓取的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 恰好一个值
    Single(ExtractedValue),
    /// 其余情况，顺序与提取路径一致
    Many(Vec<ExtractedValue>),
}

impl FetchOutcome {
    fn from_values(mut values: Vec<ExtractedValue>) -> Self {
        if values.len() == 1 {
            Self::Single(values.remove(0))
        } else {
            Self::Many(values)
        }
    }

    pub fn values(&self) -> &[ExtractedValue] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn into_values(self) -> Vec<ExtractedValue> {
        match self {
            Self::Single(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// 门户构造器。
pub struct PortalBuilder {
    config: PortalConfig,
    display: Box<dyn DisplayRenderer>,
    client: Option<Box<dyn NetworkClient>>,
    downloader: Option<Box<dyn Downloader>>,
    status: Option<Box<dyn StatusIndicator>>,
    transforms: TransformChain,
    text_transforms: Vec<(usize, TextTransform)>,
    on_success: Option<SuccessCallback>,
    qr_encoder: Option<QrEncoder>,
    time_service: Option<TimeService>,
}

impl PortalBuilder {
    pub fn new(config: PortalConfig, display: Box<dyn DisplayRenderer>) -> Self {
        Self {
            config,
            display,
            client: None,
            downloader: None,
            status: None,
            transforms: TransformChain::new(),
            text_transforms: Vec::new(),
            on_success: None,
            qr_encoder: None,
            time_service: None,
        }
    }

    /// 替换默认的 `ReqwestClient`。
    pub fn network_client(mut self, client: Box<dyn NetworkClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// 替换默认的 `HttpDownloader`。
    pub fn downloader(mut self, downloader: Box<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn status_indicator(mut self, status: Box<dyn StatusIndicator>) -> Self {
        self.status = Some(status);
        self
    }

    /// 追加一个 JSON 变换，按注册顺序执行。
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: FnMut(&mut Value) -> Result<(), TransformFailure> + 'static,
    {
        self.transforms.push(transform);
        self
    }

    /// 为第 `index` 个文本槽位设置自定义格式化。
    pub fn text_transform<F>(mut self, index: usize, transform: F) -> Self
    where
        F: Fn(&ExtractedValue) -> String + 'static,
    {
        self.text_transforms.push((index, Box::new(transform)));
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[ExtractedValue]) + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn qr_encoder(mut self, encoder: QrEncoder) -> Self {
        self.qr_encoder = Some(encoder);
        self
    }

    pub fn time_service(mut self, service: TimeService) -> Self {
        self.time_service = Some(service);
        self
    }

    /// 校验配置并创建门户。
    pub fn build(self) -> PortalResult<Portal> {
        let PortalBuilder {
            config,
            mut display,
            client,
            downloader,
            status,
            transforms,
            text_transforms,
            on_success,
            qr_encoder,
            time_service,
        } = self;

        let local = LocalFileSource::detect(&config.local_file);
        if config.url.is_none() && local.is_none() {
            return Err(PortalError::config(format!(
                "未配置数据地址，且本地文件 {} 不存在",
                config.local_file.display()
            )));
        }

        let extraction = Extraction::from_config(&config.extraction)?;

        if config.text.len() > extraction.value_count() {
            return Err(PortalError::config(format!(
                "文本槽位（{}）多于提取值（{}）",
                config.text.len(),
                extraction.value_count()
            )));
        }

        let display_size = (display.width(), display.height());
        let image = match config.image.clone() {
            Some(image_config) => {
                let downloader = match downloader {
                    Some(downloader) => downloader,
                    None => Box::new(
                        HttpDownloader::new(Duration::from_secs(image_config.download_timeout_secs))
                            .map_err(|e| {
                                PortalError::config(format!("初始化图片下载器失败：{}", e))
                            })?,
                    ),
                };
                Some(ImageResolver::new(
                    image_config,
                    display_size,
                    downloader,
                    &config.secrets,
                )?)
            }
            None => None,
        };

        let parses_json =
            extraction.needs_json() || image.as_ref().is_some_and(ImageResolver::needs_json);
        if !transforms.is_empty() && !parses_json {
            return Err(PortalError::config(
                "注册了数据变换，但当前配置不会把响应解析为 JSON",
            ));
        }

        let mut text_slots: Vec<TextSlot> = config.text.iter().map(TextSlot::from_config).collect();
        for (index, transform) in text_transforms {
            let slot = text_slots.get_mut(index).ok_or_else(|| {
                PortalError::config(format!("文本变换指向不存在的槽位 {}", index))
            })?;
            slot.set_transform(transform);
        }

        let client = match client {
            Some(client) => client,
            None => Box::new(
                ReqwestClient::new()
                    .map_err(|e| PortalError::config(format!("初始化网络客户端失败：{}", e)))?,
            ),
        };

        if let Some(local) = &local {
            log::info!("📁 发现本地文件 {}，进入离线模式", local.path().display());
        }

        display.set_background(&config.default_background);
        if let Some(caption) = &config.caption {
            display.set_caption(caption);
        }
        display.refresh(TARGET_FRAMES_PER_SECOND);

        let mut portal = Portal {
            url: config.url,
            headers: config.headers,
            timeout: Duration::from_secs(config.timeout_secs),
            local,
            client,
            extraction,
            transforms,
            image,
            text_slots,
            caption: config.caption,
            default_background: config.default_background,
            display,
            status,
            on_success,
            qr_encoder: qr_encoder.unwrap_or_default(),
            qr_mode: None,
            secrets: config.secrets,
            time_service: time_service.unwrap_or_default(),
        };
        portal.set_status(StatusPhase::Idle);

        Ok(portal)
    }
}

/// 抓取门户。
pub struct Portal {
    url: Option<String>,
    headers: BTreeMap<String, String>,
    timeout: Duration,
    local: Option<LocalFileSource>,
    client: Box<dyn NetworkClient>,
    extraction: Extraction,
    transforms: TransformChain,
    image: Option<ImageResolver>,
    text_slots: Vec<TextSlot>,
    caption: Option<Caption>,
    default_background: Background,
    display: Box<dyn DisplayRenderer>,
    status: Option<Box<dyn StatusIndicator>>,
    on_success: Option<SuccessCallback>,
    qr_encoder: QrEncoder,
    qr_mode: Option<OverlayMode>,
    secrets: Secrets,
    time_service: TimeService,
}

impl Portal {
    pub fn builder(config: PortalConfig, display: Box<dyn DisplayRenderer>) -> PortalBuilder {
        PortalBuilder::new(config, display)
    }

    /// 执行一轮抓取。
    ///
    /// `refresh_url` 会覆盖并保留为新的数据地址；`timeout` 仅作用于本轮。
    pub fn fetch(
        &mut self,
        refresh_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> PortalResult<FetchOutcome> {
        if let Some(url) = refresh_url {
            self.url = Some(url.to_string());
        }

        let result = self.run_cycle(timeout.unwrap_or(self.timeout));

        if let Err(err) = &result {
            log::error!("❌ 抓取失败（{}）：{}", err.kind(), err);
            self.set_status(StatusPhase::Error);
        }
        self.set_status(StatusPhase::Idle);

        result
    }

    fn run_cycle(&mut self, timeout: Duration) -> PortalResult<FetchOutcome> {
        let started = Instant::now();

        let response = self.acquire(timeout)?;
        let acquire_ms = started.elapsed().as_millis();

        let extract_started = Instant::now();
        let needs_json = self.extraction.needs_json()
            || self.image.as_ref().is_some_and(ImageResolver::needs_json);
        let mut json = if needs_json { Some(response.json()?) } else { None };

        if let Some(data) = json.as_mut() {
            self.transforms.apply(data)?;
        }

        let values = self.extraction.extract(&response.text, json.as_ref())?;
        let located: Option<Result<Option<ImageRequest>, ImageError>> = self
            .image
            .as_ref()
            .map(|resolver| resolver.locate(json.as_ref()));

        drop(json);
        drop(response);
        let extract_ms = extract_started.elapsed().as_millis();

        let image_started = Instant::now();
        if let Some(located) = located {
            self.apply_image(located);
        }
        let image_ms = image_started.elapsed().as_millis();

        if let Some(callback) = self.on_success.as_mut() {
            callback(&values);
        }

        let text_started = Instant::now();
        for (index, (slot, value)) in self.text_slots.iter().zip(values.iter()).enumerate() {
            let rendered = slot.format(value);
            self.display.set_text(index, &rendered);
        }
        if !self.text_slots.is_empty() {
            self.display.refresh(TARGET_FRAMES_PER_SECOND);
        }
        let text_ms = text_started.elapsed().as_millis();

        log::info!(
            "✅ 抓取完成 - {} 个值（acquire={}ms, extract={}ms, image={}ms, text={}ms, total={}ms）",
            values.len(),
            acquire_ms,
            extract_ms,
            image_ms,
            text_ms,
            started.elapsed().as_millis()
        );

        Ok(FetchOutcome::from_values(values))
    }

    fn acquire(&mut self, timeout: Duration) -> PortalResult<crate::network::HttpResponse> {
        if let Some(local) = &self.local {
            return local.read();
        }

        let url = self
            .url
            .clone()
            .ok_or_else(|| PortalError::transport("未配置数据地址"))?;

        log::info!("🌐 获取数据：{}", redact_url_for_log(&url));
        self.set_status(StatusPhase::Fetching);
        let response = self.client.get(&url, &self.headers, timeout)?;
        self.set_status(StatusPhase::Success);

        if !response.is_success() {
            return Err(PortalError::transport(format!(
                "HTTP {}: {}",
                response.status,
                status_message(response.status)
            )));
        }

        log::debug!("响应正文 {} 字节", response.text.len());
        Ok(response)
    }

    fn apply_image(&mut self, located: Result<Option<ImageRequest>, ImageError>) {
        let resolved = located.and_then(|request| match (request, self.image.as_ref()) {
            (Some(request), Some(resolver)) => resolver.resolve(&request).map(Some),
            _ => Ok(None),
        });

        match resolved {
            Ok(Some(image)) => self.set_background(Background::File {
                path: image.path,
                position: image.position,
            }),
            Ok(None) => log::debug!("本轮无图片地址，保留当前背景"),
            Err(err) => {
                log::warn!("⚠️ 图片处理失败，回退默认背景：{}", err);
                let fallback = self.default_background.clone();
                self.set_background(fallback);
            }
        }
    }

    fn set_status(&mut self, phase: StatusPhase) {
        if let Some(status) = self.status.as_mut() {
            status.set_status(phase);
        }
    }

    /// 替换后续请求使用的请求头。
    pub fn set_headers(&mut self, headers: BTreeMap<String, String>) {
        self.headers = headers;
    }

    /// 设置背景（文件或纯色）并刷新。
    pub fn set_background(&mut self, background: Background) {
        self.display.set_background(&background);
        self.display.refresh(TARGET_FRAMES_PER_SECOND);
    }

    /// 更新固定标题文本；未配置标题槽位时不做任何事。
    pub fn set_caption(&mut self, text: &str) {
        let Some(caption) = self.caption.as_mut() else {
            log::debug!("未配置标题槽位，忽略标题：{}", text);
            return;
        };
        caption.text = text.to_string();
        self.display.set_caption(caption);
    }

    /// 直接设置第 `index` 个文本槽位（只做截断与分行）。
    pub fn set_text(&mut self, value: &str, index: usize) -> PortalResult<()> {
        let slot = self
            .text_slots
            .get(index)
            .ok_or_else(|| PortalError::config(format!("不存在第 {} 个文本槽位", index)))?;
        let rendered = slot.layout(value);
        self.display.set_text(index, &rendered);
        Ok(())
    }

    /// 显示二维码，替换已有的二维码。
    pub fn show_qr(&mut self, payload: &[u8], options: QrOptions) -> PortalResult<()> {
        let overlay = self.qr_encoder.encode(payload, options)?;
        self.display.show_qr(&overlay);

        match options.mode {
            OverlayMode::Exclusive => self.display.show_only_qr(),
            OverlayMode::Incremental => {
                if self.qr_mode == Some(OverlayMode::Exclusive) {
                    self.display.show_all();
                }
            }
        }
        self.qr_mode = Some(options.mode);
        self.display.refresh(TARGET_FRAMES_PER_SECOND);

        log::info!("🔳 显示二维码（{:?}，{} 字节载荷）", options.mode, payload.len());
        Ok(())
    }

    /// 隐藏二维码；独占模式下同时恢复完整画面。
    pub fn hide_qr(&mut self) {
        match self.qr_mode.take() {
            None => {}
            Some(OverlayMode::Exclusive) => {
                self.display.clear_qr();
                self.display.show_all();
                self.display.refresh(TARGET_FRAMES_PER_SECOND);
            }
            Some(OverlayMode::Incremental) => {
                self.display.clear_qr();
                self.display.refresh(TARGET_FRAMES_PER_SECOND);
            }
        }
    }

    pub fn qr_mode(&self) -> Option<OverlayMode> {
        self.qr_mode
    }

    /// 查询某地本地时间，`secrets.timezone` 优先。
    pub fn get_local_time(&self, location: Option<&str>) -> PortalResult<LocalTime> {
        self.time_service
            .local_time(self.client.as_ref(), &self.secrets, location)
    }

    /// 是否处于本地文件离线模式。
    pub fn is_offline(&self) -> bool {
        self.local.is_some()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("url", &self.url.as_deref().map(redact_url_for_log))
            .field("offline", &self.local.is_some())
            .field("extraction", &self.extraction)
            .field("transforms", &self.transforms)
            .field("image", &self.image)
            .field("text_slots", &self.text_slots)
            .field("qr_mode", &self.qr_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{HeadlessDisplay, StatusLog};
    use crate::extract::{ExtractionConfig, JsonPath};
    use crate::network::HttpResponse;
    use crate::text::TextSlotConfig;
    use serde_json::json;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    struct CannedClient {
        response: HttpResponse,
    }

    impl NetworkClient for CannedClient {
        fn get(&self, _: &str, _: &BTreeMap<String, String>, _: Duration) -> PortalResult<HttpResponse> {
            Ok(self.response.clone())
        }
    }

    fn base_config() -> PortalConfig {
        PortalConfig {
            url: Some("http://127.0.0.1:1/data.json".to_string()),
            local_file: PathBuf::from("/nonexistent/portal/local.txt"),
            ..PortalConfig::default()
        }
    }

    fn portal_with(config: PortalConfig, response: HttpResponse) -> (Portal, Rc<RefCell<HeadlessDisplay>>) {
        let display = Rc::new(RefCell::new(HeadlessDisplay::new(320, 240)));
        let portal = Portal::builder(config, Box::new(Rc::clone(&display)))
            .network_client(Box::new(CannedClient { response }))
            .build()
            .expect("valid config");
        (portal, display)
    }

    #[test]
    fn raw_body_is_single_value_without_extraction() {
        let (mut portal, _) = portal_with(base_config(), HttpResponse::ok("hello"));
        let outcome = portal.fetch(None, None).expect("fetch should succeed");
        assert_eq!(outcome, FetchOutcome::Single(ExtractedValue::from("hello")));
    }

    #[test]
    fn non_success_status_is_transport_error() {
        let response = HttpResponse { status: 503, text: "down".into() };
        let (mut portal, _) = portal_with(base_config(), response);
        assert!(matches!(portal.fetch(None, None), Err(PortalError::Transport(msg)) if msg.contains("503")));
    }

    #[test]
    fn status_phases_follow_cycle() {
        let status = Rc::new(RefCell::new(StatusLog::default()));
        let mut portal = Portal::builder(base_config(), Box::new(HeadlessDisplay::new(320, 240)))
            .network_client(Box::new(CannedClient { response: HttpResponse::ok("x") }))
            .status_indicator(Box::new(Rc::clone(&status)))
            .build()
            .expect("valid config");

        portal.fetch(None, None).expect("fetch should succeed");

        assert_eq!(
            status.borrow().phases,
            vec![StatusPhase::Idle, StatusPhase::Fetching, StatusPhase::Success, StatusPhase::Idle]
        );
    }

    #[test]
    fn failed_cycle_shows_error_then_idle() {
        let status = Rc::new(RefCell::new(StatusLog::default()));
        let mut config = base_config();
        config.extraction = ExtractionConfig::JsonPath(vec![JsonPath::new(["missing"])]);

        let mut portal = Portal::builder(config, Box::new(HeadlessDisplay::new(320, 240)))
            .network_client(Box::new(CannedClient { response: HttpResponse::ok("{}") }))
            .status_indicator(Box::new(Rc::clone(&status)))
            .build()
            .expect("valid config");

        assert!(matches!(portal.fetch(None, None), Err(PortalError::NotFound { .. })));
        assert_eq!(
            status.borrow().phases[1..],
            [StatusPhase::Fetching, StatusPhase::Success, StatusPhase::Error, StatusPhase::Idle]
        );
    }

    #[test]
    fn refresh_url_persists() {
        let (mut portal, _) = portal_with(base_config(), HttpResponse::ok("x"));
        portal
            .fetch(Some("http://127.0.0.1:2/other.json"), None)
            .expect("fetch should succeed");
        assert_eq!(portal.url(), Some("http://127.0.0.1:2/other.json"));
    }

    #[test]
    fn text_slots_receive_formatted_values_and_callback_sees_all() {
        let mut config = base_config();
        config.extraction = ExtractionConfig::JsonPath(vec![
            JsonPath::new(["stars"]),
            JsonPath::new(["name"]),
        ]);
        config.text = vec![TextSlotConfig { position: (10, 10), color: 0xFFFFFF, wrap: 0, max_len: 0 }];

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_callback = Rc::clone(&seen);
        let display = Rc::new(RefCell::new(HeadlessDisplay::new(320, 240)));
        let mut portal = Portal::builder(config, Box::new(Rc::clone(&display)))
            .network_client(Box::new(CannedClient {
                response: HttpResponse::ok(r#"{"stars": 1234567, "name": "portal"}"#),
            }))
            .on_success(move |values| seen_in_callback.borrow_mut().extend_from_slice(values))
            .build()
            .expect("valid config");

        let outcome = portal.fetch(None, None).expect("fetch should succeed");

        assert_eq!(outcome.values().len(), 2);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(display.borrow().text(0).map(|t| t.text()), Some("1,234,567".to_string()));
        assert!(display.borrow().text(1).is_none());
    }

    #[test]
    fn custom_text_transform_is_used() {
        let mut config = base_config();
        config.text = vec![TextSlotConfig { position: (0, 0), color: 0, wrap: 0, max_len: 0 }];

        let display = Rc::new(RefCell::new(HeadlessDisplay::new(320, 240)));
        let mut portal = Portal::builder(config, Box::new(Rc::clone(&display)))
            .network_client(Box::new(CannedClient { response: HttpResponse::ok("42") }))
            .text_transform(0, |value| format!("{} online", value))
            .build()
            .expect("valid config");

        portal.fetch(None, None).expect("fetch should succeed");
        assert_eq!(display.borrow().text(0).map(|t| t.text()), Some("42 online".to_string()));
    }

    #[test]
    fn build_rejects_contradictory_configs() {
        let build = |config: PortalConfig| {
            Portal::builder(config, Box::new(HeadlessDisplay::new(320, 240)))
                .network_client(Box::new(CannedClient { response: HttpResponse::ok("") }))
        };

        // 没有地址也没有本地文件
        let mut config = base_config();
        config.url = None;
        assert!(matches!(build(config).build(), Err(PortalError::Config(_))));

        // 文本槽位多于提取值
        let mut config = base_config();
        config.text = vec![
            TextSlotConfig { position: (0, 0), color: 0, wrap: 0, max_len: 0 },
            TextSlotConfig { position: (0, 0), color: 0, wrap: 0, max_len: 0 },
        ];
        assert!(matches!(build(config).build(), Err(PortalError::Config(_))));

        // 正则捕获组数量不对
        let mut config = base_config();
        config.extraction = ExtractionConfig::Regex(vec!["no groups".into()]);
        assert!(matches!(build(config).build(), Err(PortalError::Config(_))));

        // 有变换但不解析 JSON
        let result = build(base_config()).transform(|_| Ok(())).build();
        assert!(matches!(result, Err(PortalError::Config(_))));

        // 文本变换指向不存在的槽位
        let result = build(base_config()).text_transform(3, |v| v.to_string()).build();
        assert!(matches!(result, Err(PortalError::Config(_))));
    }

    #[test]
    fn caption_and_direct_text_updates() {
        let mut config = base_config();
        config.caption = Some(Caption { text: "Stars".into(), position: (5, 5), color: 0x808080 });
        config.text = vec![TextSlotConfig { position: (0, 0), color: 0, wrap: 0, max_len: 4 }];

        let (mut portal, display) = portal_with(config, HttpResponse::ok(""));
        assert_eq!(display.borrow().caption.as_ref().map(|c| c.text.as_str()), Some("Stars"));

        portal.set_caption("Forks");
        portal.set_text("truncated", 0).expect("slot exists");

        assert_eq!(display.borrow().caption.as_ref().map(|c| c.text.as_str()), Some("Forks"));
        assert_eq!(display.borrow().text(0).map(|t| t.text()), Some("trun".to_string()));
        assert!(matches!(portal.set_text("x", 5), Err(PortalError::Config(_))));
    }

    #[test]
    fn caption_without_slot_is_noop() {
        let (mut portal, display) = portal_with(base_config(), HttpResponse::ok(""));
        portal.set_caption("ignored");
        assert!(display.borrow().caption.is_none());
    }

    #[test]
    fn qr_modes_control_layer_visibility() {
        let (mut portal, display) = portal_with(base_config(), HttpResponse::ok(""));

        portal.hide_qr();
        assert_eq!(portal.qr_mode(), None);

        let exclusive = QrOptions { scale: 2, position: (10, 10), mode: OverlayMode::Exclusive };
        portal.show_qr(b"https://example.com", exclusive).expect("encode");
        assert!(display.borrow().qr_only);
        assert!(display.borrow().qr.is_some());

        portal.hide_qr();
        assert!(!display.borrow().qr_only);
        assert!(display.borrow().qr.is_none());
        assert_eq!(portal.qr_mode(), None);

        let overlay = QrOptions { mode: OverlayMode::Incremental, ..exclusive };
        portal.show_qr(b"wifi", overlay).expect("encode");
        assert!(!display.borrow().qr_only);
        portal.hide_qr();
        assert!(display.borrow().qr.is_none());
    }

    #[test]
    fn set_background_refreshes_display() {
        let (mut portal, display) = portal_with(base_config(), HttpResponse::ok(""));
        let before = display.borrow().refreshes;

        portal.set_background(Background::Color(0xFF0000));

        assert_eq!(display.borrow().background, Some(Background::Color(0xFF0000)));
        assert_eq!(display.borrow().refreshes, before + 1);
        assert!(!portal.is_offline());
    }

    #[test]
    fn outcome_accessors() {
        let single = FetchOutcome::from_values(vec![ExtractedValue::from("a")]);
        assert_eq!(single.values(), &[ExtractedValue::from("a")]);

        let many = FetchOutcome::from_values(vec![]);
        assert_eq!(many, FetchOutcome::Many(vec![]));

        let values = json!(["x"]);
        assert_eq!(FetchOutcome::Many(vec![ExtractedValue::from_json(&values)]).into_values().len(), 1);
    }
}
