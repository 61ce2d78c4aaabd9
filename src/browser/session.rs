//! 渲染会话
//!
//! 一批只启动一个浏览器；每个路由打开自己的页面，渲染完立即关闭。

use tracing::{debug, warn};

use super::{BrowserHandle, BrowserLauncher, PageHandle};
use crate::config::BrowserOptions;
use crate::error::{PdfError, Result};
use crate::services::EffectiveConfig;

/// 单个页面的渲染结果
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub bytes: Vec<u8>,
    /// 页面 `<title>`，读取失败或为空时为 `None`
    pub title: Option<String>,
}

/// 基础 URL 与路由路径拼接，去掉基础 URL 末尾的 `/`
pub fn route_url(base_url: &str, route_path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), route_path)
}

pub struct RenderSession {
    /// 关闭后为 `None`
    browser: Option<Box<dyn BrowserHandle>>,
}

impl RenderSession {
    /// 启动浏览器
    pub async fn open(launcher: &dyn BrowserLauncher, options: &BrowserOptions) -> Result<Self> {
        let browser = launcher.launch(options).await?;
        Ok(Self {
            browser: Some(browser),
        })
    }

    pub fn is_open(&self) -> bool {
        self.browser.is_some()
    }

    /// 导航到 `base_url + route_path` 并打印为 PDF
    ///
    /// 无论成功与否页面都会被关闭。
    pub async fn render_route(
        &self,
        base_url: &str,
        route_path: &str,
        effective: &EffectiveConfig,
    ) -> Result<RenderedPage> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| PdfError::render(anyhow::anyhow!("渲染会话已关闭")))?;

        let page = browser.new_page().await?;
        let url = route_url(base_url, route_path);
        let rendered = Self::render_page(page.as_ref(), &url, effective).await;

        if let Err(e) = page.close().await {
            warn!("关闭页面失败 ({}): {}", url, e);
        }
        rendered
    }

    async fn render_page(
        page: &dyn PageHandle,
        url: &str,
        effective: &EffectiveConfig,
    ) -> Result<RenderedPage> {
        page.goto(url, effective.wait_until).await?;

        // 视口在导航之后设置
        if let Some(viewport) = &effective.viewport {
            page.set_viewport(viewport).await?;
        }

        let setup = effective.render.page_setup().map_err(PdfError::render)?;
        let bytes = page.pdf(&setup).await?;
        debug!("页面已打印: {} ({} 字节)", url, bytes.len());

        let title = match page.title().await {
            Ok(title) => title.filter(|t| !t.is_empty()),
            Err(e) => {
                debug!("读取页面标题失败 ({}): {}", url, e);
                None
            }
        };

        Ok(RenderedPage { bytes, title })
    }

    /// 关闭浏览器，可重复调用
    pub async fn close(&mut self) -> Result<()> {
        match self.browser.take() {
            Some(mut browser) => browser.close().await,
            None => Ok(()),
        }
    }
}
