//! 配置
//!
//! 全局配置按以下顺序逐层覆盖（右侧优先）：
//!
//! ```text
//! 内置默认值 < 模块配置文件 < 宿主覆盖（环境变量 ROUTE_PDF_*） < 单个路由
//! ```
//!
//! 前三层在这里合并成 [`PdfOptions`]；路由层由
//! [`config_resolver`](crate::services::config_resolver) 按路由单独叠加。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{
    MetaOverrides, PaperFormat, RenderOptions, RouteDescriptor, ViewportOverrides, WaitUntil,
};

/// 浏览器启动参数，叠加在无头模式默认值之上
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserOptions {
    pub headless: Option<bool>,
    /// Chrome / Edge 可执行文件路径，不填则自动查找
    pub executable: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub no_sandbox: Option<bool>,
    /// 单个 CDP 请求超时（秒），也用作导航等待的上限
    pub request_timeout_secs: Option<u64>,
    pub window_size: Option<(u32, u32)>,
}

impl BrowserOptions {
    pub fn overlay(&self, top: &BrowserOptions) -> BrowserOptions {
        BrowserOptions {
            headless: top.headless.or(self.headless),
            executable: top.executable.clone().or_else(|| self.executable.clone()),
            args: top.args.clone().or_else(|| self.args.clone()),
            no_sandbox: top.no_sandbox.or(self.no_sandbox),
            request_timeout_secs: top.request_timeout_secs.or(self.request_timeout_secs),
            window_size: top.window_size.or(self.window_size),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(30))
    }
}

/// 一个语言区域的配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub code: Option<String>,
    pub domain: Option<String>,
}

/// 国际化配置，只用于解析 语言代码 → 域名
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nOptions {
    pub enabled: bool,
    pub locales: Vec<LocaleConfig>,
}

impl I18nOptions {
    /// 同时包含 `code` 与 `domain` 的条目才会进入映射
    pub fn domains(&self) -> BTreeMap<String, String> {
        if !self.enabled {
            return BTreeMap::new();
        }
        self.locales
            .iter()
            .filter_map(|locale| match (&locale.code, &locale.domain) {
                (Some(code), Some(domain)) => Some((code.clone(), domain.clone())),
                _ => None,
            })
            .collect()
    }
}

/// 配置的一层（全部字段可选）
///
/// 模块配置文件和宿主覆盖都使用此结构。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOptions {
    /// 开发模式下的 PDF 输出目录
    pub dir: Option<PathBuf>,
    /// 静态导出的输出根目录
    pub export_dir: Option<PathBuf>,
    pub pdf: Option<RenderOptions>,
    pub meta: Option<MetaOverrides>,
    pub viewport: Option<ViewportOverrides>,
    pub keep: Option<bool>,
    pub wait_until: Option<WaitUntil>,
    pub routes: Option<Vec<RouteDescriptor>>,
    pub routes_file: Option<PathBuf>,
    pub i18n: Option<I18nOptions>,
    pub browser: Option<BrowserOptions>,
    pub concurrency: Option<usize>,
}

impl ModuleOptions {
    /// 从 TOML 文件加载
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// 从环境变量读取宿主覆盖层
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 同 [`ModuleOptions::from_env`]，但变量来源可替换
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self {
            dir: lookup("ROUTE_PDF_DIR").map(PathBuf::from),
            export_dir: lookup("ROUTE_PDF_EXPORT_DIR").map(PathBuf::from),
            ..Default::default()
        };

        if let Some(format) = lookup("ROUTE_PDF_FORMAT") {
            options.pdf = Some(RenderOptions::default().with_format(format));
        }
        if let Some(value) = lookup("ROUTE_PDF_KEEP") {
            options.keep = Some(parse_env("ROUTE_PDF_KEEP", &value, "bool")?);
        }
        if let Some(value) = lookup("ROUTE_PDF_CONCURRENCY") {
            options.concurrency = Some(parse_env("ROUTE_PDF_CONCURRENCY", &value, "usize")?);
        }
        if let Some(value) = lookup("ROUTE_PDF_WAIT_UNTIL") {
            let wait_until = WaitUntil::parse(&value).ok_or_else(|| ConfigError::EnvVarParseFailed {
                var_name: "ROUTE_PDF_WAIT_UNTIL".to_string(),
                value: value.clone(),
                expected_type: "load|domcontentloaded|networkidle0|networkidle2".to_string(),
            })?;
            options.wait_until = Some(wait_until);
        }
        if let Some(path) = lookup("CHROME_PATH") {
            options.browser = Some(BrowserOptions {
                executable: Some(PathBuf::from(path)),
                ..Default::default()
            });
        }

        Ok(options)
    }
}

fn parse_env<T: std::str::FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    })
}

/// 合并后的全局配置，一批内只读
#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub dir: PathBuf,
    pub export_dir: PathBuf,
    pub pdf: RenderOptions,
    pub meta: MetaOverrides,
    pub viewport: Option<ViewportOverrides>,
    pub keep: bool,
    pub wait_until: WaitUntil,
    pub routes: Vec<RouteDescriptor>,
    pub routes_file: Option<PathBuf>,
    pub i18n: I18nOptions,
    pub browser: BrowserOptions,
    /// 同时打开的页面数，1 表示严格串行
    pub concurrency: usize,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static"),
            export_dir: PathBuf::from("dist"),
            pdf: RenderOptions::default().with_format("A4"),
            meta: MetaOverrides {
                title: Some(String::new()),
                title_template: Some("%s".to_string()),
                subject: Some(String::new()),
                author: Some(String::new()),
                producer: Some(String::new()),
                keywords: Some(Vec::new()),
                creation_date: None,
            },
            viewport: None,
            keep: true,
            wait_until: WaitUntil::NetworkIdle2,
            routes: Vec::new(),
            routes_file: None,
            i18n: I18nOptions::default(),
            browser: BrowserOptions::default(),
            concurrency: 1,
        }
    }
}

impl PdfOptions {
    /// 内置默认值 < 模块配置 < 宿主覆盖
    pub fn resolve(module: ModuleOptions, host: ModuleOptions) -> Self {
        Self::default().apply(module).apply(host)
    }

    /// 把一层可选配置叠加到当前配置上
    pub fn apply(mut self, layer: ModuleOptions) -> Self {
        if let Some(dir) = layer.dir {
            self.dir = dir;
        }
        if let Some(export_dir) = layer.export_dir {
            self.export_dir = export_dir;
        }
        if let Some(pdf) = layer.pdf {
            self.pdf = self.pdf.overlay(&pdf);
        }
        if let Some(meta) = layer.meta {
            self.meta = self.meta.overlay(&meta);
        }
        if let Some(viewport) = layer.viewport {
            self.viewport = Some(match self.viewport {
                Some(base) => base.overlay(&viewport),
                None => viewport,
            });
        }
        if let Some(keep) = layer.keep {
            self.keep = keep;
        }
        if let Some(wait_until) = layer.wait_until {
            self.wait_until = wait_until;
        }
        if let Some(routes) = layer.routes {
            self.routes = routes;
        }
        if let Some(routes_file) = layer.routes_file {
            self.routes_file = Some(routes_file);
        }
        if let Some(i18n) = layer.i18n {
            self.i18n = i18n;
        }
        if let Some(browser) = layer.browser {
            self.browser = self.browser.overlay(&browser);
        }
        if let Some(concurrency) = layer.concurrency {
            self.concurrency = concurrency.max(1);
        }
        self
    }

    /// 校验全局纸张格式
    pub fn validate(&self) -> Result<PaperFormat, ConfigError> {
        PaperFormat::parse(self.pdf.format.as_deref().unwrap_or("A4"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_builtin_defaults() {
        let options = PdfOptions::default();
        assert_eq!(options.dir, PathBuf::from("static"));
        assert_eq!(options.pdf.format.as_deref(), Some("A4"));
        assert_eq!(options.meta.title_template.as_deref(), Some("%s"));
        assert!(options.keep);
        assert_eq!(options.wait_until, WaitUntil::NetworkIdle2);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.validate().unwrap(), PaperFormat::A4);
    }

    #[test]
    fn test_layer_precedence() {
        let module: ModuleOptions = toml::from_str(
            r#"
            dir = "public/pdf"
            keep = false
            waitUntil = "load"

            [pdf]
            format = "letter"
            printBackground = true

            [meta]
            titleTemplate = "%s | Site"
            author = "Module"
            "#,
        )
        .unwrap();
        let host = ModuleOptions::from_lookup(lookup(&[
            ("ROUTE_PDF_FORMAT", "A3"),
            ("ROUTE_PDF_KEEP", "true"),
        ]))
        .unwrap();

        let options = PdfOptions::resolve(module, host);
        assert_eq!(options.dir, PathBuf::from("public/pdf"));
        assert_eq!(options.pdf.format.as_deref(), Some("A3"));
        assert_eq!(options.pdf.print_background, Some(true));
        assert!(options.keep);
        assert_eq!(options.wait_until, WaitUntil::Load);
        assert_eq!(options.meta.title_template.as_deref(), Some("%s | Site"));
        assert_eq!(options.meta.author.as_deref(), Some("Module"));
        // 未被覆盖的默认值仍在
        assert_eq!(options.meta.subject.as_deref(), Some(""));
    }

    #[test]
    fn test_env_parse_error() {
        let err = ModuleOptions::from_lookup(lookup(&[("ROUTE_PDF_KEEP", "maybe")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "ROUTE_PDF_KEEP"
        ));

        let err =
            ModuleOptions::from_lookup(lookup(&[("ROUTE_PDF_WAIT_UNTIL", "idle")])).unwrap_err();
        assert!(err.to_string().contains("ROUTE_PDF_WAIT_UNTIL"));
    }

    #[test]
    fn test_unsupported_format_fails_validation() {
        let host = ModuleOptions::from_lookup(lookup(&[("ROUTE_PDF_FORMAT", "b4")])).unwrap();
        let options = PdfOptions::resolve(ModuleOptions::default(), host);
        assert!(matches!(
            options.validate(),
            Err(ConfigError::UnsupportedFormat(name)) if name == "b4"
        ));
    }

    #[test]
    fn test_i18n_domains_need_code_and_domain() {
        let i18n = I18nOptions {
            enabled: true,
            locales: vec![
                LocaleConfig {
                    code: Some("en".into()),
                    domain: Some("example.com".into()),
                },
                LocaleConfig {
                    code: Some("de".into()),
                    domain: None,
                },
                LocaleConfig {
                    code: Some("zh".into()),
                    domain: Some("example.cn".into()),
                },
            ],
        };
        let domains = i18n.domains();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains["zh"], "example.cn");

        let disabled = I18nOptions {
            enabled: false,
            ..i18n
        };
        assert!(disabled.domains().is_empty());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route-pdf.toml");
        std::fs::write(&path, "keep = \"yes\"").unwrap();

        let err = ModuleOptions::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }
}
