//! PDF 元数据写入 - 业务能力层
//!
//! 只修改文档信息字典（Info），不触碰页面结构。

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};
use tracing::debug;

use crate::error::{PdfError, Result};
use crate::models::DocumentMeta;

/// 写入元数据后的文档
#[derive(Debug, Clone)]
pub struct StampedDocument {
    pub bytes: Vec<u8>,
    /// 实际写入的标题
    pub title: String,
}

/// 从 PDF 中读回的元数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub producer: Option<String>,
    pub keywords: Vec<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub mod_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStamper;

impl DocumentStamper {
    pub fn new() -> Self {
        Self
    }

    /// 加载 PDF，写入元数据并重新序列化
    ///
    /// `fallback_title` 是页面自身的标题，在 `meta.title` 为空时使用。
    /// 日期精确到秒。
    ///
    /// 关键词以空格连接写入单个 `Keywords` 字符串，[`read_info`] 按空白拆分，
    /// 所以含空格的关键词（如 `"annual report"`）读回时会变成两个。
    pub fn stamp(
        &self,
        bytes: &[u8],
        meta: &DocumentMeta,
        fallback_title: &str,
    ) -> Result<StampedDocument> {
        let mut document = Document::load_mem(bytes).map_err(PdfError::document_load)?;

        let title = match meta.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => fallback_title.to_string(),
        };
        let now = Utc::now();
        let creation_date = meta.creation_date.unwrap_or(now);
        let keywords = meta.keywords.as_deref().unwrap_or_default().join(" ");

        let info = info_dictionary_mut(&mut document).map_err(PdfError::document_load)?;
        info.set("Title", text_string(&title));
        info.set("Author", text_string(meta.author.as_deref().unwrap_or_default()));
        info.set("Subject", text_string(meta.subject.as_deref().unwrap_or_default()));
        info.set("Producer", text_string(meta.producer.as_deref().unwrap_or_default()));
        info.set("Keywords", text_string(&keywords));
        info.set("CreationDate", date_string(creation_date));
        info.set("ModDate", date_string(now));

        let mut output = Vec::with_capacity(bytes.len());
        document
            .save_to(&mut output)
            .map_err(PdfError::document_load)?;
        debug!("元数据写入完成: 标题 '{}', {} 字节", title, output.len());

        Ok(StampedDocument {
            bytes: output,
            title,
        })
    }
}

/// 读取 PDF 的文档信息字典
pub fn read_info(bytes: &[u8]) -> Result<DocumentInfo> {
    let document = Document::load_mem(bytes).map_err(PdfError::document_load)?;
    let info = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => document
            .get_dictionary(*id)
            .map_err(PdfError::document_load)?,
        Ok(Object::Dictionary(dict)) => dict,
        _ => return Ok(DocumentInfo::default()),
    };

    let text = |key: &[u8]| {
        info.get(key)
            .ok()
            .and_then(|obj| obj.as_str().ok())
            .map(decode_text_string)
    };

    Ok(DocumentInfo {
        title: text(b"Title"),
        author: text(b"Author"),
        subject: text(b"Subject"),
        producer: text(b"Producer"),
        keywords: text(b"Keywords")
            .map(|k| k.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        creation_date: text(b"CreationDate").and_then(|d| parse_pdf_date(&d)),
        mod_date: text(b"ModDate").and_then(|d| parse_pdf_date(&d)),
    })
}

/// 取得 Info 字典，不存在时新建并挂到 trailer 上
fn info_dictionary_mut(document: &mut Document) -> lopdf::Result<&mut Dictionary> {
    let info_id = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => *id,
        Ok(Object::Dictionary(inline)) => {
            let inline = inline.clone();
            let id = document.add_object(inline);
            document.trailer.set("Info", id);
            id
        }
        _ => {
            let id = document.add_object(Dictionary::new());
            document.trailer.set("Info", id);
            id
        }
    };
    document.get_object_mut(info_id)?.as_dict_mut()
}

/// ASCII 用字面量字符串，其余用带 BOM 的 UTF-16BE
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn date_string(date: DateTime<Utc>) -> Object {
    Object::String(
        format!("D:{}Z", date.format("%Y%m%d%H%M%S")).into_bytes(),
        StringFormat::Literal,
    )
}

/// 解析 `D:YYYYMMDDHHmmSS` 以及可选的 `Z` / `+HH'mm'` 时区后缀
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    let value = value.strip_prefix("D:").unwrap_or(value);
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return None;
    }

    let field = |start: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + 2) {
            Some(part) => part.parse().ok(),
            None => Some(default),
        }
    };
    let year: i32 = digits[..4].parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, field(4, 1)?, field(6, 1)?)?.and_hms_opt(
        field(8, 0)?,
        field(10, 0)?,
        field(12, 0)?,
    )?;

    let zone = &value[digits.len()..];
    let offset_secs: i64 = match zone.chars().next() {
        Some(sign @ ('+' | '-')) => {
            let tz: String = zone[1..].chars().filter(char::is_ascii_digit).collect();
            let hours: i64 = tz.get(..2)?.parse().ok()?;
            let minutes: i64 = match tz.get(2..4) {
                Some(m) => m.parse().ok()?,
                None => 0,
            };
            let total = hours * 3600 + minutes * 60;
            if sign == '-' {
                -total
            } else {
                total
            }
        }
        _ => 0,
    };

    Some(Utc.from_utc_datetime(&(naive - chrono::Duration::seconds(offset_secs))))
}
