//! 产物写入服务 - 业务能力层
//!
//! 写 PDF 文件；静态导出模式下还负责删除路由对应的中间 HTML。

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{CleanupError, PdfError, Result};
use crate::models::RouteDescriptor;

/// 产物写入服务
///
/// 每批创建一次。`export_root` 只在静态导出模式下设置，
/// 未设置时 [`ArtifactWriter::cleanup_intermediate`] 什么也不做。
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    export_root: Option<PathBuf>,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            export_root: None,
        }
    }

    /// 启用中间产物清理，`root` 为静态导出的输出根目录
    pub fn with_export_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.export_root = Some(root.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 输出目录 + 路由的 `output_file`，转为绝对路径
    pub fn resolve_path(&self, route: &RouteDescriptor) -> Result<PathBuf> {
        let joined = self.output_dir.join(&route.output_file);
        std::path::absolute(&joined).map_err(|e| PdfError::write(joined, e))
    }

    /// 写入文件并落盘后返回绝对路径
    pub async fn write(&self, bytes: &[u8], route: &RouteDescriptor) -> Result<PathBuf> {
        let path = self.resolve_path(route)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PdfError::write(parent, e))?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| PdfError::write(&path, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| PdfError::write(&path, e))?;
        file.sync_all()
            .await
            .map_err(|e| PdfError::write(&path, e))?;

        debug!("已写入 {} 字节: {}", bytes.len(), path.display());
        Ok(path)
    }

    /// 中间产物的位置：(`<root>/<route>/index.html`, `<root>/<route>`)
    ///
    /// 路由中含有 `..` 等非普通路径段时返回 [`CleanupError::OutsideRoot`]。
    pub fn intermediate_paths(
        root: &Path,
        route_path: &str,
    ) -> std::result::Result<(PathBuf, PathBuf), CleanupError> {
        let outside = || CleanupError::OutsideRoot {
            route_path: route_path.to_string(),
            root: root.to_path_buf(),
        };

        let mut dir = root.to_path_buf();
        for component in Path::new(route_path.trim_matches('/')).components() {
            match component {
                Component::Normal(segment) => dir.push(segment),
                Component::CurDir => {}
                _ => return Err(outside()),
            }
        }
        if !dir.starts_with(root) {
            return Err(outside());
        }
        Ok((dir.join("index.html"), dir))
    }

    /// 删除路由的中间 HTML 及其目录
    ///
    /// 返回是否执行了清理；非导出模式返回 `Ok(false)`。
    /// 目录非空时删除目录会失败，由调用方记录日志。
    pub async fn cleanup_intermediate(
        &self,
        route: &RouteDescriptor,
    ) -> std::result::Result<bool, CleanupError> {
        let Some(root) = &self.export_root else {
            return Ok(false);
        };
        let (html, dir) = Self::intermediate_paths(root, &route.route_path)?;

        fs::remove_file(&html)
            .await
            .map_err(|source| CleanupError::RemoveFile {
                path: html.clone(),
                source,
            })?;
        info!("✔ 已删除路由 {} 的中间文件", route.route_path);

        // 根路由的目录就是导出根目录本身，保留
        if dir != *root {
            fs::remove_dir(&dir)
                .await
                .map_err(|source| CleanupError::RemoveDir {
                    path: dir.clone(),
                    source,
                })?;
            info!("✔ 已删除路由 {} 的中间目录", route.route_path);
        }

        Ok(true)
    }
}
