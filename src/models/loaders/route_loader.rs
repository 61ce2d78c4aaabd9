use crate::models::route::RouteDescriptor;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 路由文件的结构：`[[routes]]` 数组
#[derive(Debug, Deserialize)]
struct RouteFile {
    #[serde(default)]
    routes: Vec<RouteDescriptor>,
}

/// 从 TOML 或 JSON 文件加载路由列表
///
/// 按扩展名选择解析器，`.json` 以外一律按 TOML 处理。
pub async fn load_routes_file(path: &Path) -> Result<Vec<RouteDescriptor>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取路由文件: {}", path.display()))?;

    let file: RouteFile = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("无法解析路由文件: {}", path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("无法解析路由文件: {}", path.display()))?,
    };

    tracing::debug!(
        "从 {} 加载了 {} 个路由",
        path.file_name().unwrap_or_default().to_string_lossy(),
        file.routes.len()
    );

    Ok(file.routes)
}
