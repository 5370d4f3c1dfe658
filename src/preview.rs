use serde::{Deserialize, Serialize};
use std::fmt;

use crate::queue::MemoryQueue;
use crate::section::{ContentModel, SectionHeading};
use crate::title::{Target, NS_CATEGORY};
use crate::utils::ModerationError;

/// 待审核编辑的预览
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// 带命名空间前缀的标题
    pub title: String,
    pub content_model: ContentModel,
    pub text: String,
    /// 页面所属分类（去重，保持出现顺序）
    pub categories: Vec<String>,
    /// 章节大纲（预览中不渲染章节编辑链接）
    pub sections: Vec<SectionHeading>,
}

/// 生成队列中某条编辑的预览
///
/// # 错误
/// 编号不存在时返回 `EditNotFound`
pub fn preview(queue: &MemoryQueue, id: u64) -> Result<Preview, ModerationError> {
    let edit = queue.find(id).ok_or(ModerationError::EditNotFound(id))?;
    let target = edit.target();
    let content_model = target.content_model();

    let categories = match content_model {
        ContentModel::Wikitext => extract_categories(&edit.text),
        _ => Vec::new(),
    };

    Ok(Preview {
        title: target.prefixed_text(),
        content_model,
        text: edit.text.clone(),
        categories,
        sections: content_model.editor().sections(&edit.text),
    })
}

/// 提取 `[[Category:名称]]` 和 `[[Category:名称|排序键]]` 形式的分类
///
/// `[[:Category:名称]]` 是指向分类页面的链接，不计入分类。
pub fn extract_categories(text: &str) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("[[") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("]]") else {
            break;
        };

        let inner = &after_open[..close];
        rest = &after_open[close + 2..];

        if inner.trim_start().starts_with(':') {
            continue;
        }

        let link = inner.split('|').next().unwrap_or("");
        if let Ok(target) = Target::parse(link) {
            if target.namespace == NS_CATEGORY && !categories.contains(&target.title) {
                categories.push(target.title);
            }
        }
    }

    categories
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== 预览: {} ({}) ===", self.title, self.content_model)?;

        if !self.sections.is_empty() {
            writeln!(f, "章节:")?;
            for section in &self.sections {
                let indent = "  ".repeat(section.level.saturating_sub(1));
                writeln!(f, "  {}{}. {}", indent, section.index, section.title)?;
            }
        }

        if !self.categories.is_empty() {
            writeln!(f, "分类: {}", self.categories.join(", "))?;
        }

        writeln!(f)?;
        write!(f, "{}", self.text)
    }
}
