//! 路由处理上下文
//!
//! 封装"我正在处理第几个路由"这一信息

use std::fmt::Display;

/// 路由处理上下文
#[derive(Debug, Clone)]
pub struct RouteCtx {
    /// 路由在列表中的索引（从1开始）
    pub index: usize,

    /// 路由总数（仅用于日志显示）
    pub total: usize,

    pub route_path: String,
}

impl RouteCtx {
    pub fn new(index: usize, total: usize, route_path: impl Into<String>) -> Self {
        Self {
            index,
            total,
            route_path: route_path.into(),
        }
    }
}

impl Display for RouteCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[路由 {}/{} {}]", self.index, self.total, self.route_path)
    }
}
