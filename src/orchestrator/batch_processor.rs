//! 批处理编排器 - 编排层
//!
//! ## 职责
//!
//! 一次生命周期事件对应一批。编排器按以下状态推进：
//!
//! ```text
//! Idle → ResolvingBaseUrl → LaunchingBrowser → ProcessingRoutes → TearingDown → Done
//! ```
//!
//! - **资源所有者**：唯一持有浏览器会话和临时服务器的模块
//! - **失败隔离**：单个路由的错误只记录在该路由的结果里
//! - **保证清理**：只要进入过 `LaunchingBrowser`，浏览器和临时服务器都会被关闭

use std::collections::HashMap;
use std::fmt;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};

use crate::browser::{BrowserLauncher, RenderSession};
use crate::config::PdfOptions;
use crate::error::{PdfError, Result};
use crate::models::RouteDescriptor;
use crate::server::{AppServer, ServerListener};
use crate::services::{ArtifactWriter, RouteSource};
use crate::utils::logging::{
    log_batch_start, log_route_attempt, log_route_failure, log_route_success, print_final_stats,
};
use crate::workflow::{RouteCtx, RouteFlow, RouteSuccess};

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 开发预览：使用正在运行的开发服务器，产物写入 `dir`
    Dev,
    /// 静态导出：临时启动服务器，产物写入 `export_dir`，按 `keep` 清理中间 HTML
    Export,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Dev => f.write_str("开发模式"),
            Mode::Export => f.write_str("静态导出模式"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    ResolvingBaseUrl,
    LaunchingBrowser,
    ProcessingRoutes,
    TearingDown,
    Done,
}

/// 单个路由的结果，失败时保留错误信息
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    /// 从1开始
    pub index: usize,
    pub route_path: String,
    pub result: std::result::Result<RouteSuccess, String>,
}

/// 一批的汇总，顺序与输入路由一致
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub mode: Mode,
    pub base_url: String,
    pub outcomes: Vec<RouteOutcome>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }
}

/// 批处理编排器，每批新建一个
pub struct BatchOrchestrator<'a> {
    options: &'a PdfOptions,
    mode: Mode,
    launcher: &'a dyn BrowserLauncher,
    app_server: Option<&'a dyn AppServer>,
    listen_url: Option<String>,
    phase: BatchPhase,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(options: &'a PdfOptions, mode: Mode, launcher: &'a dyn BrowserLauncher) -> Self {
        Self {
            options,
            mode,
            launcher,
            app_server: None,
            listen_url: None,
            phase: BatchPhase::Idle,
        }
    }

    /// 导出模式下用于获取基础 URL 的临时服务器
    pub fn with_app_server(mut self, server: &'a dyn AppServer) -> Self {
        self.app_server = Some(server);
        self
    }

    /// 开发服务器已监听的地址
    pub fn with_listen_url(mut self, url: Option<String>) -> Self {
        self.listen_url = url;
        self
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    fn enter(&mut self, phase: BatchPhase) {
        debug!("批处理状态: {:?} → {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// 运行一批
    ///
    /// 只有致命错误（路由解析、基础 URL、浏览器启动）才返回 `Err`。
    pub async fn run(&mut self, source: &RouteSource) -> Result<BatchSummary> {
        self.enter(BatchPhase::ResolvingBaseUrl);
        let (base_url, listener) = self.resolve_base_url().await?;

        let result = self.run_with_base_url(&base_url, source).await;

        self.enter(BatchPhase::TearingDown);
        if let Some(listener) = listener {
            if let Err(e) = listener.close().await {
                warn!("⚠️ 关闭临时服务器失败: {:#}", e);
            }
        }
        self.enter(BatchPhase::Done);

        let summary = result?;
        print_final_stats(&summary);
        Ok(summary)
    }

    async fn resolve_base_url(&self) -> Result<(String, Option<Box<dyn ServerListener>>)> {
        if self.mode == Mode::Export {
            if let Some(server) = self.app_server {
                match server.listen().await {
                    Ok(listener) => {
                        let url = listener.url().to_string();
                        return Ok((url, Some(listener)));
                    }
                    Err(e) => {
                        error!("❌ 启动临时服务器失败: {:#}", e);
                        warn!("💡 请确认已经执行过静态构建，改用已缓存的地址");
                    }
                }
            }
        }

        match &self.listen_url {
            Some(url) => Ok((url.clone(), None)),
            None => Err(PdfError::BaseUrlUnavailable(match self.mode {
                Mode::Dev => "开发服务器尚未开始监听".to_string(),
                Mode::Export => "临时服务器不可用，且没有已缓存的地址".to_string(),
            })),
        }
    }

    async fn run_with_base_url(&mut self, base_url: &str, source: &RouteSource) -> Result<BatchSummary> {
        let routes = source.resolve().await?;
        let concurrency = self.options.concurrency.max(1);
        log_batch_start(self.mode, routes.len(), concurrency, base_url);

        self.enter(BatchPhase::LaunchingBrowser);
        let mut session = RenderSession::open(self.launcher, &self.options.browser).await?;

        self.enter(BatchPhase::ProcessingRoutes);
        let outcomes = self
            .process_routes(&session, base_url, &routes, concurrency)
            .await;

        self.enter(BatchPhase::TearingDown);
        if let Err(e) = session.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }

        Ok(BatchSummary {
            mode: self.mode,
            base_url: base_url.to_string(),
            outcomes,
        })
    }

    fn writer(&self) -> ArtifactWriter {
        match self.mode {
            Mode::Dev => ArtifactWriter::new(&self.options.dir),
            Mode::Export => ArtifactWriter::new(&self.options.export_dir)
                .with_export_root(&self.options.export_dir),
        }
    }

    /// 按顺序输出结果；`concurrency` 大于 1 时最多同时处理这么多路由
    ///
    /// 所有路由渲染完后才清理中间产物，每个路径只清理一次。
    async fn process_routes(
        &self,
        session: &RenderSession,
        base_url: &str,
        routes: &[RouteDescriptor],
        concurrency: usize,
    ) -> Vec<RouteOutcome> {
        let writer = self.writer();
        let flow = RouteFlow::new(self.options, &writer);
        let flow = &flow;
        let total = routes.len();

        let mut outcomes: Vec<RouteOutcome> = stream::iter(routes.iter().enumerate())
            .map(|(i, route)| async move {
                let ctx = RouteCtx::new(i + 1, total, route.route_path.clone());
                log_route_attempt(&ctx);

                let result = match flow.run(session, base_url, route, &ctx).await {
                    Ok(success) => {
                        log_route_success(&ctx, &success);
                        Ok(success)
                    }
                    Err(e) => {
                        let message = e.to_string();
                        log_route_failure(&ctx, &message);
                        Err(message)
                    }
                };

                RouteOutcome {
                    index: ctx.index,
                    route_path: ctx.route_path,
                    result,
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        // 路径 → 是否已删除
        let mut handled: HashMap<String, bool> = HashMap::new();
        for (route, outcome) in routes.iter().zip(outcomes.iter_mut()) {
            let Ok(success) = outcome.result.as_mut() else {
                continue;
            };
            if success.keep {
                continue;
            }
            success.cleaned = match handled.get(&route.route_path) {
                Some(cleaned) => *cleaned,
                None => {
                    let ctx = RouteCtx::new(outcome.index, total, route.route_path.clone());
                    let cleaned = flow.cleanup(route, &ctx).await;
                    handled.insert(route.route_path.clone(), cleaned);
                    cleaned
                }
            };
        }

        outcomes
    }
}
