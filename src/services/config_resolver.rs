//! 单路由配置合并
//!
//! 每个路由独立计算，不在路由之间共享或缓存合并结果。

use crate::config::PdfOptions;
use crate::models::{DocumentMeta, RenderOptions, RouteDescriptor, Viewport, WaitUntil};

/// 一个路由最终生效的配置
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub render: RenderOptions,
    /// 全局和路由都没有配置视口时为 `None`，此时不修改页面视口
    pub viewport: Option<Viewport>,
    pub meta: DocumentMeta,
    pub keep: bool,
    pub wait_until: WaitUntil,
}

/// 把路由覆盖叠加到全局配置上
pub fn resolve_route(options: &PdfOptions, route: &RouteDescriptor) -> EffectiveConfig {
    let render = match &route.render_options {
        Some(overrides) => options.pdf.overlay(overrides),
        None => options.pdf.clone(),
    };

    let viewport = match (&options.viewport, &route.viewport) {
        (Some(global), Some(local)) => Some(global.overlay(local).resolve()),
        (Some(only), None) | (None, Some(only)) => Some(only.resolve()),
        (None, None) => None,
    };

    let merged = match &route.meta {
        Some(overrides) => options.meta.overlay(overrides),
        None => options.meta.clone(),
    };
    let title = match merged.title.as_deref() {
        Some(title) if !title.is_empty() => Some(apply_title_template(
            merged.title_template.as_deref().unwrap_or("%s"),
            title,
        )),
        _ => None,
    };

    EffectiveConfig {
        render,
        viewport,
        meta: DocumentMeta {
            title,
            subject: merged.subject,
            author: merged.author,
            producer: merged.producer,
            keywords: merged.keywords,
            creation_date: merged.creation_date,
        },
        keep: route.keep_intermediate.unwrap_or(options.keep),
        wait_until: options.wait_until,
    }
}

/// 只替换第一个 `%s`
pub fn apply_title_template(template: &str, title: &str) -> String {
    template.replacen("%s", title, 1)
}
