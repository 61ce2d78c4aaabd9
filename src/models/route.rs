use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::meta::MetaOverrides;
use super::render::{RenderOptions, ViewportOverrides};

/// 一个待生成的路由
///
/// 每批由路由解析器生成一次，之后只读。配置文件里也接受
/// `route` / `file` / `pdf` / `keep` 这些简写字段名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    /// 相对基础 URL 的页面路径，例如 `/about`
    #[serde(alias = "route")]
    pub route_path: String,
    /// 产物相对输出目录的路径，例如 `about.pdf`
    #[serde(alias = "file")]
    pub output_file: PathBuf,
    pub meta: Option<MetaOverrides>,
    #[serde(alias = "pdf")]
    pub render_options: Option<RenderOptions>,
    pub viewport: Option<ViewportOverrides>,
    /// 仅对该路由覆盖全局的 `keep`
    #[serde(alias = "keep")]
    pub keep_intermediate: Option<bool>,
}

impl RouteDescriptor {
    pub fn new(route_path: impl Into<String>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            route_path: route_path.into(),
            output_file: output_file.into(),
            meta: None,
            render_options: None,
            viewport: None,
            keep_intermediate: None,
        }
    }

    pub fn with_meta(mut self, meta: MetaOverrides) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = Some(options);
        self
    }

    pub fn with_viewport(mut self, viewport: ViewportOverrides) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep_intermediate = Some(keep);
        self
    }
}

/// 宿主框架路由表中的一项（静态导出时需要额外生成的页面）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRoute {
    pub route: String,
    pub payload: Option<serde_json::Value>,
}

impl GeneratedRoute {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            payload: None,
        }
    }
}
