//! # Route PDF
//!
//! 驱动无头浏览器把站点的路由逐个渲染成 PDF，写入元数据后保存
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 持有浏览器进程，只暴露"开页面、导航、打印"能力
//! - `server/` - 静态导出模式下的临时服务器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单个路由
//! - `RouteSource` - 把静态列表 / 异步生产者 / 回调生产者统一成路由列表
//! - `config_resolver` - 合并全局配置与路由覆盖
//! - `DocumentStamper` - 写入 PDF 元数据
//! - `ArtifactWriter` - 写文件、清理中间产物
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个路由"的完整处理流程
//! - `RouteCtx` - 上下文封装（索引 + 路由路径）
//! - `RouteFlow` - 流程编排（合并配置 → 渲染 → 元数据 → 写文件 → 清理）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批处理状态机，管理浏览器与服务器的生命周期
//! - `orchestrator/pdf_module` - 宿主生命周期事件适配

pub mod browser;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{ModuleOptions, PdfOptions};
pub use error::{ConfigError, PdfError, Result};
pub use models::RouteDescriptor;
pub use orchestrator::{BatchSummary, LifecycleEvent, Mode, PdfModule};
pub use services::RouteSource;
pub use workflow::{RouteCtx, RouteFlow};
