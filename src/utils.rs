use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 自定义错误类型
///
/// 每个变体都对应一个稳定的 API 错误代码（见 [`ModerationError::code`]），
/// 调用方据此向 API 客户端报告失败。
#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("There is no section {0}.")]
    NoSuchSection(String),

    #[error("Uploads via API are not allowed for users whose edits are moderated.")]
    NoUploadModule,

    #[error("Edit #{0} was not found in the moderation queue.")]
    EditNotFound(u64),

    #[error("Invalid title: {0:?}")]
    InvalidTitle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// API 错误响应体
///
/// 序列化后形如 `{"code": "nosuchsection", "info": "There is no section 3."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// 机器可读的错误代码
    pub code: String,
    /// 人类可读的错误说明
    pub info: String,
}

impl ModerationError {
    /// 获取 API 错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ModerationError::NoSuchSection(_) => "nosuchsection",
            ModerationError::NoUploadModule => "nouploadmodule",
            ModerationError::EditNotFound(_) => "moderation-edit-not-found",
            ModerationError::InvalidTitle(_) => "invalidtitle",
            ModerationError::IoError(_) | ModerationError::JsonError(_) => "internal_api_error",
        }
    }

    /// 转换为 API 错误响应体
    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            code: self.code().to_string(),
            info: self.to_string(),
        }
    }

    /// 生成错误页面的 wikitext
    ///
    /// 错误信息包裹在 `mw-mod-error` 容器中，前端和浏览器测试依赖这个 id 定位错误。
    pub fn report_wikitext(&self) -> String {
        format!(
            "<div id=\"mw-mod-error\" class=\"error\">{}</div>",
            escape_html(&self.to_string())
        )
    }
}

/// 转义 HTML 特殊字符
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 规范化标题文本
///
/// - 下划线视为空格
/// - 连续空白折叠为单个空格，去除首尾空白
/// - 首字母大写
pub fn normalize_title(text: &str) -> String {
    let spaced = text.replace('_', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 视为末尾空白的字符（空格、制表符、换行、回车、NUL、垂直制表符）
///
/// 不包含 NBSP 等 Unicode 空白，wikitext 中这些字符是有意义的内容。
const TRAILING_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// 去除末尾空白
pub fn trim_trailing_whitespace(text: &str) -> &str {
    text.trim_end_matches(TRAILING_WHITESPACE)
}

/// 检查参数值是否"存在"（键存在且非空）
pub fn is_present(value: Option<&str>) -> bool {
    value.map(|v| !v.is_empty()).unwrap_or(false)
}
