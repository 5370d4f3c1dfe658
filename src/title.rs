use serde::{Deserialize, Serialize};
use std::fmt;

use crate::queue::PageDirectory;
use crate::request::EditRequest;
use crate::section::ContentModel;
use crate::utils::{normalize_title, ModerationError};

/// 标准命名空间表（id, 规范名称）
const CANONICAL_NAMESPACES: &[(i32, &str)] = &[
    (-2, "Media"),
    (-1, "Special"),
    (1, "Talk"),
    (2, "User"),
    (3, "User talk"),
    (4, "Project"),
    (5, "Project talk"),
    (6, "File"),
    (7, "File talk"),
    (8, "MediaWiki"),
    (9, "MediaWiki talk"),
    (10, "Template"),
    (11, "Template talk"),
    (12, "Help"),
    (13, "Help talk"),
    (14, "Category"),
    (15, "Category talk"),
];

/// 命名空间别名
const NAMESPACE_ALIASES: &[(i32, &str)] = &[(6, "Image"), (7, "Image talk")];

pub const NS_MAIN: i32 = 0;
pub const NS_USER: i32 = 2;
pub const NS_MEDIAWIKI: i32 = 8;
pub const NS_CATEGORY: i32 = 14;

/// 标题中不允许出现的字符
const ILLEGAL_TITLE_CHARS: &[char] = &['<', '>', '[', ']', '|', '{', '}'];

/// 编辑目标：命名空间 + 规范化标题
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// 命名空间 id
    pub namespace: i32,
    /// 规范化后的标题（不含命名空间前缀）
    pub title: String,
}

impl Target {
    /// 直接构造目标，标题会被规范化
    pub fn new(namespace: i32, title: &str) -> Self {
        Self {
            namespace,
            title: normalize_title(title),
        }
    }

    /// 解析带命名空间前缀的标题文本，如 `Talk:Foo_bar`
    pub fn parse(text: &str) -> Result<Self, ModerationError> {
        let text = text.trim();
        let text = text.strip_prefix(':').unwrap_or(text);
        // 片段部分（#...）不属于标题
        let text = text.split('#').next().unwrap_or("");

        if text.contains(ILLEGAL_TITLE_CHARS) {
            return Err(ModerationError::InvalidTitle(text.to_string()));
        }

        let (namespace, rest) = match text.split_once(':') {
            Some((prefix, rest)) => match namespace_id(prefix) {
                Some(id) => (id, rest),
                None => (NS_MAIN, text),
            },
            None => (NS_MAIN, text),
        };

        let title = normalize_title(rest);
        if title.is_empty() {
            return Err(ModerationError::InvalidTitle(text.to_string()));
        }

        Ok(Self { namespace, title })
    }

    /// 带命名空间前缀的完整标题
    pub fn prefixed_text(&self) -> String {
        match namespace_name(self.namespace) {
            Some(name) => format!("{}:{}", name, self.title),
            None => self.title.clone(),
        }
    }

    /// 根据命名空间和后缀推断内容模型
    ///
    /// 只有 User 和 MediaWiki 命名空间中的 `.css`/`.js`/`.json` 页面是代码页面。
    pub fn content_model(&self) -> ContentModel {
        if self.namespace != NS_USER && self.namespace != NS_MEDIAWIKI {
            return ContentModel::Wikitext;
        }

        if self.title.ends_with(".css") {
            ContentModel::Css
        } else if self.title.ends_with(".js") {
            ContentModel::JavaScript
        } else if self.title.ends_with(".json") {
            ContentModel::Json
        } else {
            ContentModel::Wikitext
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefixed_text())
    }
}

/// 按前缀查找命名空间 id（大小写不敏感，下划线等同空格）
pub fn namespace_id(prefix: &str) -> Option<i32> {
    let wanted = prefix.replace('_', " ").trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    CANONICAL_NAMESPACES
        .iter()
        .chain(NAMESPACE_ALIASES.iter())
        .find(|(_, name)| name.to_lowercase() == wanted)
        .map(|&(id, _)| id)
}

/// 获取命名空间的规范名称，主命名空间和未知命名空间返回 None
pub fn namespace_name(id: i32) -> Option<&'static str> {
    CANONICAL_NAMESPACES
        .iter()
        .find(|&&(ns, _)| ns == id)
        .map(|&(_, name)| name)
}

/// 从请求中解析编辑目标
///
/// 优先使用 `title`，否则通过页面目录解析 `pageid`。
/// 无法解析时返回 None，由下游编辑处理报告错误。
pub fn resolve_request_target(
    request: &EditRequest,
    directory: &dyn PageDirectory,
) -> Option<Target> {
    if let Some(title) = request.get("title").filter(|t| !t.is_empty()) {
        return match Target::parse(title) {
            Ok(target) => Some(target),
            Err(e) => {
                tracing::debug!(title, error = %e, "unresolvable title in edit request");
                None
            }
        };
    }

    let page_id = request.get("pageid")?.trim().parse::<u64>().ok()?;
    directory.resolve_page_id(page_id)
}
