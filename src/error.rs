use std::path::PathBuf;

use thiserror::Error;

/// 任意来源的底层错误（浏览器、PDF 库、用户提供的路由生产者）
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 批处理错误类型
///
/// 按影响范围分为两类：
/// - 整批致命：`Config` / `RouteResolution` / `BaseUrlUnavailable` / `BrowserLaunch`
/// - 单个路由：`Navigation` / `Render` / `DocumentLoad` / `Write`，只把该路由记为失败
#[derive(Debug, Error)]
pub enum PdfError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 无法确定要生成的路由列表
    #[error("路由解析失败: {message}")]
    RouteResolution {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// 既没有开发服务器地址，也无法启动临时服务器
    #[error("无法确定基础 URL: {0}")]
    BaseUrlUnavailable(String),

    /// 浏览器启动失败
    #[error("启动浏览器失败: {source}")]
    BrowserLaunch {
        #[source]
        source: BoxError,
    },

    /// 页面导航失败
    #[error("导航到 {url} 失败: {source}")]
    Navigation {
        url: String,
        #[source]
        source: BoxError,
    },

    /// 页面转换为 PDF 失败
    #[error("生成 PDF 失败: {source}")]
    Render {
        #[source]
        source: BoxError,
    },

    /// PDF 字节无法解析
    #[error("加载 PDF 文档失败: {source}")]
    DocumentLoad {
        #[source]
        source: BoxError,
    },

    /// 写入产物失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PdfError {
    /// 是否会终止整个批次
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PdfError::Config(_)
                | PdfError::RouteResolution { .. }
                | PdfError::BaseUrlUnavailable(_)
                | PdfError::BrowserLaunch { .. }
        )
    }

    pub fn route_resolution(message: impl Into<String>) -> Self {
        PdfError::RouteResolution {
            message: message.into(),
            source: None,
        }
    }

    pub fn browser_launch(source: impl Into<BoxError>) -> Self {
        PdfError::BrowserLaunch {
            source: source.into(),
        }
    }

    pub fn navigation(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        PdfError::Navigation {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn render(source: impl Into<BoxError>) -> Self {
        PdfError::Render {
            source: source.into(),
        }
    }

    pub fn document_load(source: impl Into<BoxError>) -> Self {
        PdfError::DocumentLoad {
            source: source.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PdfError::Write {
            path: path.into(),
            source,
        }
    }
}

/// 配置错误（模块初始化阶段）
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 不在支持列表中的纸张格式
    #[error("无法找到纸张格式 ('{0}')")]
    UnsupportedFormat(String),

    /// 无法识别的 CSS 长度，例如 `1xx`
    #[error("无法解析长度 '{0}'，支持 px/in/cm/mm")]
    InvalidLength(String),

    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// 配置文件格式错误
    #[error("解析配置文件失败 ({}): {message}", .path.display())]
    ParseFailed { path: PathBuf, message: String },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 清理中间产物时的错误，只记录日志，不影响路由结果
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("删除中间文件失败 ({}): {source}", .path.display())]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("删除中间目录失败 ({}): {source}", .path.display())]
    RemoveDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// 路由路径指向导出根目录之外
    #[error("路由 {route_path} 超出导出目录 ({})，拒绝清理", .root.display())]
    OutsideRoot { route_path: String, root: PathBuf },
}

/// 批处理结果类型
pub type Result<T> = std::result::Result<T, PdfError>;
