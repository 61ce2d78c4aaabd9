//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `pdf_module` - 宿主生命周期适配
//! - 校验配置（纸张格式）
//! - 记录开发服务器地址
//! - 根据运行模式决定哪个事件触发批处理
//! - 扩展宿主的路由表
//!
//! ### `batch_processor` - 批处理编排器
//! - 解析基础 URL（开发服务器或临时静态服务器）
//! - 解析路由列表（每批一次）
//! - 持有浏览器会话，逐个（或有限并发）处理路由
//! - 保证关闭浏览器和临时服务器，输出统计
//!
//! ## 层次关系
//!
//! ```text
//! pdf_module (生命周期事件)
//!     ↓
//! batch_processor (处理 Vec<RouteDescriptor>)
//!     ↓
//! workflow::RouteFlow (处理单个路由)
//!     ↓
//! services (配置合并 / 元数据 / 写文件)
//!     ↓
//! browser, server (基础设施)
//! ```

pub mod batch_processor;
pub mod pdf_module;

pub use batch_processor::{BatchOrchestrator, BatchPhase, BatchSummary, Mode, RouteOutcome};
pub use pdf_module::{LifecycleEvent, PdfModule};
