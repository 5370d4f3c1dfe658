/// 章节编辑模块
///
/// 该模块提供按内容模型区分的章节提取/替换接口。
/// 改写器只依赖 [`SectionEditor`] trait，不关心具体的文档格式。
///
/// # 架构设计
///
/// - **wikitext**: 基于 `== 标题 ==` 的章节编辑器
/// - **PlainTextEditor**: 无章节的纯文本/代码页面
///
/// # 使用示例
///
/// ```rust
/// use moderation_hooks::section::{ContentModel, SectionEditor};
///
/// let editor = ContentModel::Wikitext.editor();
/// let text = "Intro\n\n== A ==\nOld A text";
/// assert_eq!(editor.extract_section(text, 1).as_deref(), Some("Old A text"));
/// ```
pub mod wikitext;


use serde::{Deserialize, Serialize};
use std::fmt;

pub use wikitext::WikitextEditor;

/// 章节标题信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeading {
    /// 章节序号（从 1 开始，0 为导言）
    pub index: usize,
    /// 标题级别（`==` 为 2）
    pub level: usize,
    /// 标题文本
    pub title: String,
}

/// 章节编辑器 trait
///
/// # 职责
/// - 从文档中提取指定章节的内容
/// - 用新内容替换指定章节，返回完整文档
///
/// 不支持章节的内容模型对任何序号都返回 None。
pub trait SectionEditor {
    /// 提取章节内容（不含标题行）
    ///
    /// # 返回
    /// 章节不存在时返回 None
    fn extract_section(&self, text: &str, index: usize) -> Option<String>;

    /// 替换章节内容（保留标题行）
    ///
    /// # 返回
    /// 替换后的完整文档；章节不存在时返回 None
    fn replace_section(&self, text: &str, index: usize, new_content: &str) -> Option<String>;

    /// 列出文档中的所有章节标题
    fn sections(&self, text: &str) -> Vec<SectionHeading>;
}

/// 不支持章节的编辑器（纯文本、CSS、JavaScript、JSON）
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextEditor;

impl SectionEditor for PlainTextEditor {
    fn extract_section(&self, _text: &str, _index: usize) -> Option<String> {
        None
    }

    fn replace_section(&self, _text: &str, _index: usize, _new_content: &str) -> Option<String> {
        None
    }

    fn sections(&self, _text: &str) -> Vec<SectionHeading> {
        Vec::new()
    }
}

static WIKITEXT_EDITOR: WikitextEditor = WikitextEditor;
static PLAIN_TEXT_EDITOR: PlainTextEditor = PlainTextEditor;

/// 页面内容模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentModel {
    Wikitext,
    Text,
    Css,
    JavaScript,
    Json,
}

impl ContentModel {
    /// 获取该内容模型对应的章节编辑器
    pub fn editor(self) -> &'static dyn SectionEditor {
        match self {
            ContentModel::Wikitext => &WIKITEXT_EDITOR,
            ContentModel::Text
            | ContentModel::Css
            | ContentModel::JavaScript
            | ContentModel::Json => &PLAIN_TEXT_EDITOR,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentModel::Wikitext => "wikitext",
            ContentModel::Text => "text",
            ContentModel::Css => "css",
            ContentModel::JavaScript => "javascript",
            ContentModel::Json => "json",
        }
    }
}

impl fmt::Display for ContentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
