//! 临时应用服务器
//!
//! 静态导出模式下，如果没有可用的开发服务器地址，就临时启动一个服务器
//! 为浏览器提供页面，批处理结束后关闭。

pub mod static_site;

use async_trait::async_trait;

pub use static_site::StaticSiteServer;

/// 可以临时启动的应用服务器
#[async_trait]
pub trait AppServer: Send + Sync {
    /// 开始监听，返回可访问的地址
    async fn listen(&self) -> anyhow::Result<Box<dyn ServerListener>>;
}

/// 正在运行的服务器
#[async_trait]
pub trait ServerListener: Send + Sync {
    /// 形如 `http://127.0.0.1:43210`
    fn url(&self) -> &str;

    async fn close(self: Box<Self>) -> anyhow::Result<()>;
}
