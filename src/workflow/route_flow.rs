//! 路由处理流程 - 流程层
//!
//! 核心职责：定义"一个路由"的完整处理流程
//!
//! 流程顺序：
//! 1. 合并配置
//! 2. 渲染页面 → PDF
//! 3. 写入元数据
//! 4. 写文件
//!
//! 中间产物的清理（仅导出模式且 keep = false）由编排层在整批渲染结束后
//! 调用 [`RouteFlow::cleanup`]，同一路径的重复路由都能读到页面。

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::browser::RenderSession;
use crate::config::PdfOptions;
use crate::error::Result;
use crate::models::RouteDescriptor;
use crate::services::{resolve_route, ArtifactWriter, DocumentStamper};
use crate::workflow::route_ctx::RouteCtx;

/// 单个路由成功后的产物
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSuccess {
    pub output_path: PathBuf,
    /// 写入 PDF 的标题
    pub title: String,
    /// 生效的 keep，false 表示需要清理中间 HTML
    pub keep: bool,
    /// 是否删除了中间 HTML
    pub cleaned: bool,
}

/// 路由处理流程
///
/// - 不持有浏览器，由编排层传入会话
/// - 只依赖业务能力（services）
pub struct RouteFlow<'a> {
    options: &'a PdfOptions,
    writer: &'a ArtifactWriter,
    stamper: DocumentStamper,
}

impl<'a> RouteFlow<'a> {
    pub fn new(options: &'a PdfOptions, writer: &'a ArtifactWriter) -> Self {
        Self {
            options,
            writer,
            stamper: DocumentStamper::new(),
        }
    }

    pub async fn run(
        &self,
        session: &RenderSession,
        base_url: &str,
        route: &RouteDescriptor,
        ctx: &RouteCtx,
    ) -> Result<RouteSuccess> {
        let effective = resolve_route(self.options, route);
        debug!("{} 生效配置: {:?}", ctx, effective);

        let rendered = session
            .render_route(base_url, &route.route_path, &effective)
            .await?;
        debug!("{} ✓ 渲染完成 ({} 字节)", ctx, rendered.bytes.len());

        let stamped = self.stamper.stamp(
            &rendered.bytes,
            &effective.meta,
            rendered.title.as_deref().unwrap_or_default(),
        )?;

        let output_path = self.writer.write(&stamped.bytes, route).await?;
        info!("{} ✔ 已生成 {}", ctx, output_path.display());

        Ok(RouteSuccess {
            output_path,
            title: stamped.title,
            keep: effective.keep,
            cleaned: false,
        })
    }

    /// 删除路由的中间 HTML，失败只记录日志
    pub async fn cleanup(&self, route: &RouteDescriptor, ctx: &RouteCtx) -> bool {
        match self.writer.cleanup_intermediate(route).await {
            Ok(cleaned) => cleaned,
            Err(e) => {
                warn!("{} ⚠️ 清理中间产物失败: {}", ctx, e);
                false
            }
        }
    }
}
