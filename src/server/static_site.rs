//! 基于 tiny_http 的静态目录服务器，服务静态导出的输出目录

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};

use super::{AppServer, ServerListener};

#[derive(Debug, Clone)]
pub struct StaticSiteServer {
    root: PathBuf,
    bind: SocketAddr,
}

impl StaticSiteServer {
    /// 在 127.0.0.1 的随机端口上服务 `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        }
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }
}

#[async_trait]
impl AppServer for StaticSiteServer {
    async fn listen(&self) -> Result<Box<dyn ServerListener>> {
        if !self.root.is_dir() {
            return Err(anyhow!(
                "静态目录不存在: {}，请先执行构建",
                self.root.display()
            ));
        }

        let server = Server::http(self.bind)
            .map_err(|e| anyhow!("绑定 {} 失败: {}", self.bind, e))?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| anyhow!("无法获取监听地址"))?;
        let server = Arc::new(server);

        let root = self.root.clone();
        let worker = Arc::clone(&server);
        let thread = std::thread::Builder::new()
            .name("static-site".into())
            .spawn(move || run_request_loop(&worker, &root))
            .context("启动静态服务器线程失败")?;

        let url = format!("http://{}", addr);
        info!("🌐 静态服务器已启动: {} -> {}", url, self.root.display());

        Ok(Box::new(StaticSiteListener {
            url,
            server,
            thread: Some(thread),
        }))
    }
}

struct StaticSiteListener {
    url: String,
    server: Arc<Server>,
    thread: Option<JoinHandle<()>>,
}

#[async_trait]
impl ServerListener for StaticSiteListener {
    fn url(&self) -> &str {
        &self.url
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .context("等待静态服务器线程失败")?
                .map_err(|_| anyhow!("静态服务器线程异常退出"))?;
        }
        info!("✔ 静态服务器已关闭: {}", self.url);
        Ok(())
    }
}

fn run_request_loop(server: &Server, root: &Path) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root) {
            warn!("处理请求失败: {}", e);
        }
    }
}

fn handle_request(request: Request, root: &Path) -> Result<()> {
    debug!("{} {}", request.method(), request.url());

    if !matches!(request.method(), Method::Get | Method::Head) {
        return send_body(request, 405, "text/plain", b"405 Method Not Allowed".to_vec());
    }

    match resolve_path(request.url(), root) {
        Some(path) => respond_file(request, &path),
        None => send_body(request, 404, "text/plain", b"404 Not Found".to_vec()),
    }
}

fn respond_file(request: Request, path: &Path) -> Result<()> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = if request.method() == &Method::Head {
        Vec::new()
    } else {
        std::fs::read(path).with_context(|| format!("读取 {} 失败", path.display()))?
    };
    send_body(request, 200, mime.essence_str(), body)
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let header = Header::from_bytes("Content-Type", content_type)
        .map_err(|_| anyhow!("无效的 Content-Type: {}", content_type))?;
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header);
    request.respond(response)?;
    Ok(())
}

/// URL 映射到 `root` 下的文件；目录取其 `index.html`，越界路径返回 `None`
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = root.join(&clean).canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// 解码、去掉查询串和首尾 `/`
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or_default();
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}
