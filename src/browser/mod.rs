//! 浏览器 - 基础设施层
//!
//! 编排层只通过下面三个 trait 使用浏览器：
//! - `BrowserLauncher`：启动一个浏览器进程
//! - `BrowserHandle`：持有进程，开页面、关闭进程
//! - `PageHandle`：一个标签页，导航、设置视口、导出 PDF
//!
//! 生产实现基于 chromiumoxide（见 [`chromium`]）。

pub mod chromium;
pub mod session;

#[cfg(test)]
pub(crate) mod fakes;

use async_trait::async_trait;

use crate::config::BrowserOptions;
use crate::error::Result;
use crate::models::{PageSetup, Viewport, WaitUntil};

pub use chromium::ChromiumLauncher;
pub use session::{route_url, RenderSession, RenderedPage};

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// 失败时返回 `PdfError::BrowserLaunch`
    async fn launch(&self, options: &BrowserOptions) -> Result<Box<dyn BrowserHandle>>;
}

#[async_trait]
pub trait BrowserHandle: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>>;

    /// 结束浏览器进程
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait PageHandle: Send + Sync {
    /// 导航并等待 `wait_until` 条件成立
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> Result<()>;

    async fn set_viewport(&self, viewport: &Viewport) -> Result<()>;

    /// 页面 `<title>`
    async fn title(&self) -> Result<Option<String>>;

    async fn pdf(&self, setup: &PageSetup) -> Result<Vec<u8>>;

    async fn close(self: Box<Self>) -> Result<()>;
}
