use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, FrameId, PrintToPdfParams};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{BrowserHandle, BrowserLauncher, PageHandle};
use crate::config::BrowserOptions;
use crate::error::{PdfError, Result};
use crate::models::{PageSetup, Viewport, WaitUntil};

/// 基于 chromiumoxide 启动本地 Chrome / Chromium / Edge
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

fn build_config(options: &BrowserOptions) -> std::result::Result<BrowserConfig, String> {
    let mut builder = BrowserConfig::builder();
    builder = if options.headless.unwrap_or(true) {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = &options.executable {
        builder = builder.chrome_executable(path);
    }
    if options.no_sandbox.unwrap_or(false) {
        builder = builder.no_sandbox();
    }
    if let Some((width, height)) = options.window_size {
        builder = builder.window_size(width, height);
    }

    let mut args = vec![
        "--disable-gpu".to_string(),           // 无头模式下禁用 GPU
        "--disable-dev-shm-usage".to_string(), // 防止共享内存不足
    ];
    args.extend(options.args.clone().unwrap_or_default());

    builder
        .request_timeout(options.request_timeout())
        .args(args)
        .build()
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, options: &BrowserOptions) -> Result<Box<dyn BrowserHandle>> {
        info!("🚀 启动无头浏览器...");

        let config = build_config(options).map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            PdfError::browser_launch(anyhow!("配置无头浏览器失败: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            PdfError::browser_launch(e)
        })?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("浏览器事件处理出错: {}", e);
                }
            }
        });

        Ok(Box::new(ChromiumBrowser {
            browser,
            handler_task: Some(handler_task),
            timeout: options.request_timeout(),
        }))
    }
}

struct ChromiumBrowser {
    browser: Browser,
    /// 关闭后为 `None`
    handler_task: Option<JoinHandle<()>>,
    timeout: Duration,
}

#[async_trait]
impl BrowserHandle for ChromiumBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| {
            error!("创建页面失败: {}", e);
            PdfError::render(e)
        })?;
        Ok(Box::new(ChromiumPage {
            page,
            timeout: self.timeout,
        }))
    }

    async fn close(&mut self) -> Result<()> {
        let Some(handler_task) = self.handler_task.take() else {
            return Ok(());
        };

        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!("等待浏览器进程退出失败: {}", e);
        }
        handler_task.abort();

        closed
            .map(|_| ())
            .map_err(|e| PdfError::render(anyhow!("关闭浏览器失败: {}", e)))
    }
}

struct ChromiumPage {
    page: Page,
    timeout: Duration,
}

impl ChromiumPage {
    async fn navigate(
        &self,
        url: &str,
        wait_until: WaitUntil,
        events: &mut EventStream<EventLifecycleEvent>,
    ) -> anyhow::Result<()> {
        // goto 本身会等到 load 事件
        self.page.goto(url).await?;
        if matches!(wait_until, WaitUntil::Load | WaitUntil::DomContentLoaded) {
            return Ok(());
        }

        let main_frame = self.page.mainframe().await?;
        wait_for_lifecycle(events, main_frame, wait_until.lifecycle_event()).await
    }
}

/// 等待主框架本次导航（以 `init` 事件的 loader 区分）触发 `target` 事件
async fn wait_for_lifecycle(
    events: &mut EventStream<EventLifecycleEvent>,
    main_frame: Option<FrameId>,
    target: &str,
) -> anyhow::Result<()> {
    let mut loader = None;
    while let Some(event) = events.next().await {
        if main_frame
            .as_ref()
            .is_some_and(|frame| *frame != event.frame_id)
        {
            continue;
        }
        if event.name == "init" {
            loader = Some(event.loader_id.clone());
            continue;
        }
        if event.name == target && loader.as_ref() == Some(&event.loader_id) {
            return Ok(());
        }
    }
    Err(anyhow!("页面生命周期事件流已关闭"))
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> Result<()> {
        debug!("导航到 {} (等待 {:?})", url, wait_until);
        let mut events = self
            .page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| PdfError::navigation(url, e))?;

        match tokio::time::timeout(self.timeout, self.navigate(url, wait_until, &mut events)).await {
            Ok(result) => result.map_err(|e| PdfError::navigation(url, e)),
            Err(_) => Err(PdfError::navigation(
                url,
                anyhow!("等待 {:?} 超时 ({}s)", wait_until, self.timeout.as_secs()),
            )),
        }
    }

    async fn set_viewport(&self, viewport: &Viewport) -> Result<()> {
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            viewport.device_scale_factor,
            viewport.is_mobile,
        );
        self.page.execute(params).await.map_err(PdfError::render)?;
        Ok(())
    }

    async fn title(&self) -> Result<Option<String>> {
        self.page.get_title().await.map_err(PdfError::render)
    }

    async fn pdf(&self, setup: &PageSetup) -> Result<Vec<u8>> {
        let params = PrintToPdfParams {
            landscape: Some(setup.landscape),
            display_header_footer: Some(setup.display_header_footer),
            print_background: Some(setup.print_background),
            scale: Some(setup.scale),
            paper_width: Some(setup.paper_width),
            paper_height: Some(setup.paper_height),
            margin_top: Some(setup.margin_top),
            margin_bottom: Some(setup.margin_bottom),
            margin_left: Some(setup.margin_left),
            margin_right: Some(setup.margin_right),
            page_ranges: setup.page_ranges.clone(),
            header_template: setup.header_template.clone(),
            footer_template: setup.footer_template.clone(),
            prefer_css_page_size: Some(setup.prefer_css_page_size),
            ..Default::default()
        };
        self.page.pdf(params).await.map_err(PdfError::render)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.map_err(PdfError::render)
    }
}
