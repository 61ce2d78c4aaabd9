//! 测试用的浏览器替身，记录每次调用

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object};

use super::{BrowserHandle, BrowserLauncher, PageHandle};
use crate::config::BrowserOptions;
use crate::error::{PdfError, Result};
use crate::models::{PageSetup, Viewport, WaitUntil};

/// 一页空白 A4
pub fn blank_pdf() -> Vec<u8> {
    let mut document = Document::with_version("1.7");
    let pages_id = document.new_object_id();

    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.0_f32.into(), 0.0_f32.into(), 595.0_f32.into(), 842.0_f32.into()],
    });
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    document
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).unwrap();
    bytes
}

#[derive(Debug, Default)]
pub struct FakeBrowserState {
    pub launches: usize,
    pub closes: usize,
    pub pages_opened: usize,
    pub pages_closed: usize,
    pub open_pages: usize,
    pub max_open_pages: usize,
    pub visited: Vec<String>,
    pub viewports: Vec<Viewport>,
    pub setups: Vec<PageSetup>,
}

#[derive(Debug, Default)]
struct FakeBehavior {
    fail_launch: bool,
    fail_urls: HashSet<String>,
    title: Option<String>,
    delay: Option<Duration>,
    site_root: Option<PathBuf>,
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<FakeBrowserState>>,
    behavior: Arc<FakeBehavior>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    fn behavior_mut(&mut self) -> &mut FakeBehavior {
        Arc::get_mut(&mut self.behavior).unwrap()
    }

    pub fn fail_launch(mut self) -> Self {
        self.behavior_mut().fail_launch = true;
        self
    }

    /// 导航到该 URL 时失败
    pub fn fail_url(mut self, url: &str) -> Self {
        self.behavior_mut().fail_urls.insert(url.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.behavior_mut().title = Some(title.to_string());
        self
    }

    /// 每次导航前等待，用于观察并发
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior_mut().delay = Some(delay);
        self
    }

    /// 导航时要求 `<root>/<path>/index.html` 存在，否则按 404 失败
    pub fn serve_from(mut self, root: &Path) -> Self {
        self.behavior_mut().site_root = Some(root.to_path_buf());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeBrowserState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _options: &BrowserOptions) -> Result<Box<dyn BrowserHandle>> {
        if self.behavior.fail_launch {
            return Err(PdfError::browser_launch(anyhow::anyhow!(
                "找不到 Chrome 可执行文件"
            )));
        }
        self.state().launches += 1;
        Ok(Box::new(FakeBrowser {
            launcher: self.clone(),
            closed: false,
        }))
    }
}

struct FakeBrowser {
    launcher: FakeLauncher,
    closed: bool,
}

#[async_trait]
impl BrowserHandle for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>> {
        let mut state = self.launcher.state();
        state.pages_opened += 1;
        state.open_pages += 1;
        state.max_open_pages = state.max_open_pages.max(state.open_pages);
        Ok(Box::new(FakePage {
            launcher: self.launcher.clone(),
        }))
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.launcher.state().closes += 1;
        }
        Ok(())
    }
}

struct FakePage {
    launcher: FakeLauncher,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn goto(&self, url: &str, _wait_until: WaitUntil) -> Result<()> {
        if let Some(delay) = self.launcher.behavior.delay {
            tokio::time::sleep(delay).await;
        }
        self.launcher.state().visited.push(url.to_string());
        if self.launcher.behavior.fail_urls.contains(url) {
            return Err(PdfError::navigation(url, anyhow::anyhow!("net::ERR_CONNECTION_REFUSED")));
        }
        if let Some(root) = &self.launcher.behavior.site_root {
            // http://host/path → path
            let path = url.splitn(4, '/').nth(3).unwrap_or_default();
            let html = root.join(path.trim_matches('/')).join("index.html");
            if !html.is_file() {
                return Err(PdfError::navigation(url, anyhow::anyhow!("404 Not Found")));
            }
        }
        Ok(())
    }

    async fn set_viewport(&self, viewport: &Viewport) -> Result<()> {
        self.launcher.state().viewports.push(*viewport);
        Ok(())
    }

    async fn title(&self) -> Result<Option<String>> {
        Ok(self.launcher.behavior.title.clone())
    }

    async fn pdf(&self, setup: &PageSetup) -> Result<Vec<u8>> {
        self.launcher.state().setups.push(setup.clone());
        Ok(blank_pdf())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut state = self.launcher.state();
        state.pages_closed += 1;
        state.open_pages -= 1;
        Ok(())
    }
}
