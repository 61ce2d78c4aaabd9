//! 路由来源 - 业务能力层
//!
//! 三种来源统一解析成一个有序的路由列表：
//! - `StaticList`：配置里直接写好的列表
//! - `AsyncProducer`：返回 future 的生产者
//! - `CallbackProducer`：通过回调交付结果的生产者

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;

use crate::error::{BoxError, PdfError, Result};
use crate::models::{load_routes_file, RouteDescriptor};

pub type RouteList = Vec<RouteDescriptor>;

/// 回调式生产者收到的完成回调
pub type RouteCallback = Box<dyn FnOnce(ProducerResult) + Send>;

pub type ProducerResult = std::result::Result<RouteList, BoxError>;
type AsyncProducerFn = dyn Fn() -> BoxFuture<'static, ProducerResult> + Send + Sync;
type CallbackProducerFn = dyn Fn(RouteCallback) + Send + Sync;

#[derive(Clone)]
pub enum RouteSource {
    StaticList(RouteList),
    AsyncProducer(Arc<AsyncProducerFn>),
    CallbackProducer(Arc<CallbackProducerFn>),
}

impl RouteSource {
    pub fn from_async<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProducerResult> + Send + 'static,
    {
        RouteSource::AsyncProducer(Arc::new(move || producer().boxed()))
    }

    pub fn from_callback<F>(producer: F) -> Self
    where
        F: Fn(RouteCallback) + Send + Sync + 'static,
    {
        RouteSource::CallbackProducer(Arc::new(producer))
    }

    /// 每次解析时重新读取路由文件
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::from_async(move || {
            let path = path.clone();
            async move { load_routes_file(&path).await.map_err(BoxError::from) }
        })
    }

    /// 解析出有序路由列表
    pub async fn resolve(&self) -> Result<RouteList> {
        match self {
            RouteSource::StaticList(routes) => Ok(routes.clone()),
            RouteSource::AsyncProducer(producer) => {
                producer().await.map_err(|source| PdfError::RouteResolution {
                    message: format!("路由生产者返回错误: {}", source),
                    source: Some(source),
                })
            }
            RouteSource::CallbackProducer(producer) => {
                let (tx, rx) = oneshot::channel();
                producer(Box::new(move |result| {
                    // 接收端已放弃时无需处理
                    let _ = tx.send(result);
                }));

                match rx.await {
                    Ok(Ok(routes)) => Ok(routes),
                    Ok(Err(source)) => Err(PdfError::RouteResolution {
                        message: format!("路由回调返回错误: {}", source),
                        source: Some(source),
                    }),
                    Err(_) => Err(PdfError::route_resolution("路由回调未被调用就被丢弃")),
                }
            }
        }
    }
}

impl Default for RouteSource {
    fn default() -> Self {
        RouteSource::StaticList(Vec::new())
    }
}

impl fmt::Debug for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSource::StaticList(routes) => {
                f.debug_tuple("StaticList").field(&routes.len()).finish()
            }
            RouteSource::AsyncProducer(_) => f.write_str("AsyncProducer"),
            RouteSource::CallbackProducer(_) => f.write_str("CallbackProducer"),
        }
    }
}
