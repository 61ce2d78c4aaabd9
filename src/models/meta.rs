//! 文档元数据

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 元数据覆盖层
///
/// 全局配置和单个路由使用同一结构；未设置的字段从下层继承。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaOverrides {
    pub title: Option<String>,
    /// 标题模板，第一个 `%s` 会被替换为 `title`
    pub title_template: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub creation_date: Option<DateTime<Utc>>,
}

impl MetaOverrides {
    /// 以 `top` 覆盖当前层，逐字段合并
    pub fn overlay(&self, top: &MetaOverrides) -> MetaOverrides {
        MetaOverrides {
            title: top.title.clone().or_else(|| self.title.clone()),
            title_template: top
                .title_template
                .clone()
                .or_else(|| self.title_template.clone()),
            subject: top.subject.clone().or_else(|| self.subject.clone()),
            author: top.author.clone().or_else(|| self.author.clone()),
            producer: top.producer.clone().or_else(|| self.producer.clone()),
            keywords: top.keywords.clone().or_else(|| self.keywords.clone()),
            creation_date: top.creation_date.or(self.creation_date),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_title_template(mut self, template: impl Into<String>) -> Self {
        self.title_template = Some(template.into());
        self
    }
}

/// 写入 PDF 前的最终元数据
///
/// `title` 为 `None` 时使用页面自身的 `<title>`。其余缺省字段由
/// [`DocumentStamper`](crate::services::DocumentStamper) 补齐。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMeta {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub creation_date: Option<DateTime<Utc>>,
}
