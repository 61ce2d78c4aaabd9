//! 渲染参数：纸张、页边距、视口、导航等待条件

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 支持的纸张格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    A1,
    A2,
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PaperFormat {
    pub const ALL: [PaperFormat; 8] = [
        PaperFormat::A1,
        PaperFormat::A2,
        PaperFormat::A3,
        PaperFormat::A4,
        PaperFormat::A5,
        PaperFormat::Letter,
        PaperFormat::Legal,
        PaperFormat::Tabloid,
    ];

    /// 不区分大小写地解析格式名
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| ConfigError::UnsupportedFormat(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            PaperFormat::A1 => "a1",
            PaperFormat::A2 => "a2",
            PaperFormat::A3 => "a3",
            PaperFormat::A4 => "a4",
            PaperFormat::A5 => "a5",
            PaperFormat::Letter => "letter",
            PaperFormat::Legal => "legal",
            PaperFormat::Tabloid => "tabloid",
        }
    }

    /// 纵向尺寸 (宽, 高)，单位英寸
    pub fn size_inches(self) -> (f64, f64) {
        match self {
            PaperFormat::A1 => (23.4, 33.1),
            PaperFormat::A2 => (16.54, 23.4),
            PaperFormat::A3 => (11.7, 16.54),
            PaperFormat::A4 => (8.27, 11.7),
            PaperFormat::A5 => (5.83, 8.27),
            PaperFormat::Letter => (8.5, 11.0),
            PaperFormat::Legal => (8.5, 14.0),
            PaperFormat::Tabloid => (11.0, 17.0),
        }
    }
}

/// 把 CSS 长度转换为英寸；纯数字按 px 处理
pub fn parse_length(value: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidLength(value.to_string());
    let re = Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*(px|in|cm|mm)?\s*$").map_err(|_| invalid())?;
    let caps = re.captures(value).ok_or_else(invalid)?;
    let number: f64 = caps[1].parse().map_err(|_| invalid())?;
    let unit = caps.get(2).map_or("px", |m| m.as_str());

    let inches = match unit {
        "in" => number,
        "cm" => number / 2.54,
        "mm" => number / 25.4,
        _ => number / 96.0,
    };
    Ok(inches)
}

/// 页边距，CSS 长度字符串
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: Option<String>,
    pub right: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
}

impl Margin {
    fn overlay(&self, top: &Margin) -> Margin {
        Margin {
            top: top.top.clone().or_else(|| self.top.clone()),
            right: top.right.clone().or_else(|| self.right.clone()),
            bottom: top.bottom.clone().or_else(|| self.bottom.clone()),
            left: top.left.clone().or_else(|| self.left.clone()),
        }
    }
}

/// 页面转 PDF 的参数（`pdf.*`）
///
/// 全局与路由共用此结构；`format` 保留原始字符串，
/// 在 [`RenderOptions::page_setup`] 中才校验。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub format: Option<String>,
    pub landscape: Option<bool>,
    pub print_background: Option<bool>,
    pub scale: Option<f64>,
    /// 显式纸张宽度，优先于 `format`
    pub width: Option<String>,
    pub height: Option<String>,
    pub margin: Option<Margin>,
    pub page_ranges: Option<String>,
    pub display_header_footer: Option<bool>,
    pub header_template: Option<String>,
    pub footer_template: Option<String>,
    #[serde(rename = "preferCSSPageSize", alias = "preferCssPageSize")]
    pub prefer_css_page_size: Option<bool>,
}

impl RenderOptions {
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn overlay(&self, top: &RenderOptions) -> RenderOptions {
        let margin = match (&self.margin, &top.margin) {
            (Some(base), Some(over)) => Some(base.overlay(over)),
            (base, over) => over.clone().or_else(|| base.clone()),
        };
        RenderOptions {
            format: top.format.clone().or_else(|| self.format.clone()),
            landscape: top.landscape.or(self.landscape),
            print_background: top.print_background.or(self.print_background),
            scale: top.scale.or(self.scale),
            width: top.width.clone().or_else(|| self.width.clone()),
            height: top.height.clone().or_else(|| self.height.clone()),
            margin,
            page_ranges: top.page_ranges.clone().or_else(|| self.page_ranges.clone()),
            display_header_footer: top.display_header_footer.or(self.display_header_footer),
            header_template: top
                .header_template
                .clone()
                .or_else(|| self.header_template.clone()),
            footer_template: top
                .footer_template
                .clone()
                .or_else(|| self.footer_template.clone()),
            prefer_css_page_size: top.prefer_css_page_size.or(self.prefer_css_page_size),
        }
    }

    /// 换算成浏览器打印参数（英寸）
    pub fn page_setup(&self) -> Result<PageSetup, ConfigError> {
        let format = match &self.format {
            Some(name) => PaperFormat::parse(name)?,
            None => PaperFormat::A4,
        };
        let (format_width, format_height) = format.size_inches();

        let paper_width = match &self.width {
            Some(w) => parse_length(w)?,
            None => format_width,
        };
        let paper_height = match &self.height {
            Some(h) => parse_length(h)?,
            None => format_height,
        };

        let margin = self.margin.clone().unwrap_or_default();
        let side = |value: &Option<String>| -> Result<f64, ConfigError> {
            value.as_deref().map_or(Ok(0.0), parse_length)
        };

        Ok(PageSetup {
            landscape: self.landscape.unwrap_or(false),
            print_background: self.print_background.unwrap_or(false),
            scale: self.scale.unwrap_or(1.0),
            paper_width,
            paper_height,
            margin_top: side(&margin.top)?,
            margin_right: side(&margin.right)?,
            margin_bottom: side(&margin.bottom)?,
            margin_left: side(&margin.left)?,
            page_ranges: self.page_ranges.clone(),
            display_header_footer: self.display_header_footer.unwrap_or(false),
            header_template: self.header_template.clone(),
            footer_template: self.footer_template.clone(),
            prefer_css_page_size: self.prefer_css_page_size.unwrap_or(false),
        })
    }
}

/// 已换算好的打印参数
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub landscape: bool,
    pub print_background: bool,
    pub scale: f64,
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub page_ranges: Option<String>,
    pub display_header_footer: bool,
    pub header_template: Option<String>,
    pub footer_template: Option<String>,
    pub prefer_css_page_size: bool,
}

/// 视口覆盖层
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub device_scale_factor: Option<f64>,
    pub is_mobile: Option<bool>,
}

impl ViewportOverrides {
    pub fn overlay(&self, top: &ViewportOverrides) -> ViewportOverrides {
        ViewportOverrides {
            width: top.width.or(self.width),
            height: top.height.or(self.height),
            device_scale_factor: top.device_scale_factor.or(self.device_scale_factor),
            is_mobile: top.is_mobile.or(self.is_mobile),
        }
    }

    /// 补齐缺省值（800x600，缩放 1）
    pub fn resolve(&self) -> Viewport {
        Viewport {
            width: self.width.unwrap_or(800),
            height: self.height.unwrap_or(600),
            device_scale_factor: self.device_scale_factor.unwrap_or(1.0),
            is_mobile: self.is_mobile.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
}

/// 导航完成的判定条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitUntil {
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    /// 500ms 内没有网络连接
    #[serde(rename = "networkidle0")]
    NetworkIdle0,
    /// 500ms 内不超过 2 个网络连接
    #[default]
    #[serde(rename = "networkidle2")]
    NetworkIdle2,
}

impl WaitUntil {
    /// 对应的 CDP 生命周期事件名
    pub fn lifecycle_event(self) -> &'static str {
        match self {
            WaitUntil::Load => "load",
            WaitUntil::DomContentLoaded => "DOMContentLoaded",
            WaitUntil::NetworkIdle0 => "networkIdle",
            WaitUntil::NetworkIdle2 => "networkAlmostIdle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "load" => Some(WaitUntil::Load),
            "domcontentloaded" => Some(WaitUntil::DomContentLoaded),
            "networkidle0" => Some(WaitUntil::NetworkIdle0),
            "networkidle2" => Some(WaitUntil::NetworkIdle2),
            _ => None,
        }
    }
}
