//! 宿主生命周期适配
//!
//! 宿主框架把生命周期事件交给 [`PdfModule::handle`]：
//! - `Listen`：记录开发服务器地址
//! - `BuildCompiled { name: "server" }`：开发模式下触发一批
//! - `GenerateDone`：静态导出模式下触发一批
//!
//! 另外在生成路由表时调用 [`PdfModule::extend_routes`]。

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::browser::{BrowserLauncher, ChromiumLauncher};
use crate::config::PdfOptions;
use crate::error::{ConfigError, Result};
use crate::models::{GeneratedRoute, PaperFormat};
use crate::orchestrator::batch_processor::{BatchOrchestrator, BatchSummary, Mode};
use crate::server::{AppServer, StaticSiteServer};
use crate::services::RouteSource;

/// 宿主框架的生命周期事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// 开发服务器开始监听
    Listen { url: String },
    /// 某个编译目标完成
    BuildCompiled { name: String },
    /// 静态导出完成
    GenerateDone,
}

pub struct PdfModule {
    options: PdfOptions,
    mode: Mode,
    format: PaperFormat,
    launcher: Arc<dyn BrowserLauncher>,
    app_server: Option<Arc<dyn AppServer>>,
    route_source: RouteSource,
    /// 最近一次 `Listen` 事件的地址
    listen_url: Option<String>,
}

impl PdfModule {
    /// 校验配置并创建模块
    ///
    /// 纸张格式不受支持时记录错误并返回 `ConfigError`，不会处理任何路由。
    pub fn new(options: PdfOptions, mode: Mode) -> std::result::Result<Self, ConfigError> {
        let format = options.validate().map_err(|e| {
            error!(" ERROR  {}", e);
            e
        })?;

        let route_source = match &options.routes_file {
            Some(path) => RouteSource::from_file(path),
            None => RouteSource::StaticList(options.routes.clone()),
        };
        let app_server: Option<Arc<dyn AppServer>> = match mode {
            Mode::Export => Some(Arc::new(StaticSiteServer::new(&options.export_dir))),
            Mode::Dev => None,
        };

        debug!("PDF 模块已初始化: {} / 纸张 {}", mode, format.name());
        Ok(Self {
            options,
            mode,
            format,
            launcher: Arc::new(ChromiumLauncher),
            app_server,
            route_source,
            listen_url: None,
        })
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// 替换导出模式下的临时服务器，`None` 表示只使用已缓存的地址
    pub fn with_app_server(mut self, server: Option<Arc<dyn AppServer>>) -> Self {
        self.app_server = server;
        self
    }

    pub fn with_route_source(mut self, source: RouteSource) -> Self {
        self.route_source = source;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn format(&self) -> PaperFormat {
        self.format
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    pub fn base_url(&self) -> Option<&str> {
        self.listen_url.as_deref()
    }

    /// 语言代码 → 域名
    pub fn i18n_domains(&self) -> BTreeMap<String, String> {
        self.options.i18n.domains()
    }

    /// 处理一个生命周期事件，触发批处理时返回汇总
    pub async fn handle(&mut self, event: LifecycleEvent) -> Result<Option<BatchSummary>> {
        match event {
            LifecycleEvent::Listen { url } => {
                debug!("开发服务器地址: {}", url);
                self.listen_url = Some(url);
                Ok(None)
            }
            LifecycleEvent::BuildCompiled { name } if self.mode == Mode::Dev && name == "server" => {
                self.run_batch().await.map(Some)
            }
            LifecycleEvent::GenerateDone if self.mode == Mode::Export => {
                self.run_batch().await.map(Some)
            }
            other => {
                debug!("忽略事件 {:?} ({})", other, self.mode);
                Ok(None)
            }
        }
    }

    /// 运行一批
    pub async fn run_batch(&self) -> Result<BatchSummary> {
        let mut orchestrator = BatchOrchestrator::new(&self.options, self.mode, self.launcher.as_ref())
            .with_listen_url(self.listen_url.clone());
        if let Some(server) = &self.app_server {
            orchestrator = orchestrator.with_app_server(server.as_ref());
        }
        orchestrator.run(&self.route_source).await
    }

    /// 把路由追加到宿主的路由表，已存在的路径跳过
    ///
    /// 返回追加的数量。这里的去重只影响路由表，渲染时不去重。
    pub async fn extend_routes(&self, table: &mut Vec<GeneratedRoute>) -> Result<usize> {
        let routes = self.route_source.resolve().await?;
        let mut known: HashSet<String> = table.iter().map(|r| r.route.clone()).collect();

        let before = table.len();
        for route in routes {
            if known.insert(route.route_path.clone()) {
                table.push(GeneratedRoute::new(route.route_path));
            }
        }

        let added = table.len() - before;
        info!("✓ 已向路由表追加 {} 个路由", added);
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fakes::FakeLauncher;
    use crate::config::{I18nOptions, LocaleConfig};
    use crate::error::PdfError;
    use crate::models::{RenderOptions, RouteDescriptor};

    fn options(dir: &std::path::Path) -> PdfOptions {
        PdfOptions {
            dir: dir.to_path_buf(),
            routes: vec![
                RouteDescriptor::new("/", "index.pdf"),
                RouteDescriptor::new("/about", "about.pdf"),
            ],
            ..PdfOptions::default()
        }
    }

    #[test]
    fn test_unsupported_format_aborts_init() {
        let options = PdfOptions {
            pdf: RenderOptions::default().with_format("b4"),
            ..PdfOptions::default()
        };
        let err = PdfModule::new(options, Mode::Dev).err().unwrap();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref name) if name == "b4"));
    }

    #[test]
    fn test_format_is_case_insensitive() {
        let options = PdfOptions {
            pdf: RenderOptions::default().with_format("Letter"),
            ..PdfOptions::default()
        };
        let module = PdfModule::new(options, Mode::Dev).unwrap();
        assert_eq!(module.format(), PaperFormat::Letter);
    }

    #[tokio::test]
    async fn test_dev_mode_runs_only_on_server_build() {
        let out = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new().with_title("Home"));
        let mut module = PdfModule::new(options(out.path()), Mode::Dev)
            .unwrap()
            .with_launcher(launcher.clone());

        let ignored = module
            .handle(LifecycleEvent::BuildCompiled {
                name: "client".into(),
            })
            .await
            .unwrap();
        assert!(ignored.is_none());
        assert!(module.handle(LifecycleEvent::GenerateDone).await.unwrap().is_none());

        module
            .handle(LifecycleEvent::Listen {
                url: "http://localhost:3000/".into(),
            })
            .await
            .unwrap();
        assert_eq!(module.base_url(), Some("http://localhost:3000/"));

        let summary = module
            .handle(LifecycleEvent::BuildCompiled {
                name: "server".into(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(
            launcher.state().visited,
            ["http://localhost:3000/", "http://localhost:3000/about"]
        );
        assert!(out.path().join("about.pdf").exists());
    }

    #[tokio::test]
    async fn test_dev_mode_without_listen_url() {
        let out = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut module = PdfModule::new(options(out.path()), Mode::Dev)
            .unwrap()
            .with_launcher(launcher.clone());

        let err = module
            .handle(LifecycleEvent::BuildCompiled {
                name: "server".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::BaseUrlUnavailable(_)));
        assert_eq!(launcher.state().launches, 0);
    }

    #[tokio::test]
    async fn test_export_mode_serves_export_dir() {
        let dist = tempfile::tempdir().unwrap();
        std::fs::write(dist.path().join("index.html"), "<title>Home</title>").unwrap();

        let launcher = Arc::new(FakeLauncher::new());
        let options = PdfOptions {
            export_dir: dist.path().to_path_buf(),
            routes: vec![RouteDescriptor::new("/", "home.pdf")],
            ..PdfOptions::default()
        };
        let mut module = PdfModule::new(options, Mode::Export)
            .unwrap()
            .with_launcher(launcher.clone());

        let summary = module
            .handle(LifecycleEvent::GenerateDone)
            .await
            .unwrap()
            .unwrap();
        assert!(summary.base_url.starts_with("http://127.0.0.1:"));
        assert_eq!(summary.succeeded(), 1);
        assert!(dist.path().join("home.pdf").exists());
        // keep 默认为 true
        assert!(dist.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn test_extend_routes_dedups_by_path() {
        let out = tempfile::tempdir().unwrap();
        let module = PdfModule::new(options(out.path()), Mode::Export)
            .unwrap()
            .with_route_source(RouteSource::StaticList(vec![
                RouteDescriptor::new("/", "index.pdf"),
                RouteDescriptor::new("/about", "about.pdf"),
                RouteDescriptor::new("/about", "about-print.pdf"),
                RouteDescriptor::new("/docs", "docs.pdf"),
            ]));

        let mut table = vec![GeneratedRoute::new("/")];
        let added = module.extend_routes(&mut table).await.unwrap();

        assert_eq!(added, 2);
        let paths: Vec<&str> = table.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(paths, ["/", "/about", "/docs"]);
        assert!(table.iter().all(|r| r.payload.is_none()));
    }

    #[tokio::test]
    async fn test_routes_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("routes.toml");
        std::fs::write(
            &file,
            r#"
            [[routes]]
            route = "/guide"
            file = "guide.pdf"
            "#,
        )
        .unwrap();

        let options = PdfOptions {
            routes_file: Some(file),
            ..PdfOptions::default()
        };
        let module = PdfModule::new(options, Mode::Export).unwrap();
        let mut table = Vec::new();
        assert_eq!(module.extend_routes(&mut table).await.unwrap(), 1);
        assert_eq!(table[0].route, "/guide");
    }

    #[test]
    fn test_i18n_domains() {
        let options = PdfOptions {
            i18n: I18nOptions {
                enabled: true,
                locales: vec![LocaleConfig {
                    code: Some("fr".into()),
                    domain: Some("exemple.fr".into()),
                }],
            },
            ..PdfOptions::default()
        };
        let module = PdfModule::new(options, Mode::Dev).unwrap();
        assert_eq!(module.i18n_domains()["fr"], "exemple.fr");
    }
}
