/// 待审核编辑请求改写模块
///
/// 对于 `action=edit` 的部分编辑请求（`section`、`prependtext`、`appendtext`），
/// 如果目标页面存在待审核修订，就把请求改写成基于待审核文本的完整 `text` 编辑。
/// 否则下游会把追加内容拼接到当前线上版本，并对只存在于待审核版本中的章节报告 nosuchsection。

use serde::{Deserialize, Serialize};

use crate::queue::{NoPageDirectory, PageDirectory, PendingRevision, PendingStore};
use crate::request::EditRequest;
use crate::title::{resolve_request_target, Target};
use crate::utils::{is_present, trim_trailing_whitespace, ModerationError};

/// 新建章节的 section 取值
pub const NEW_SECTION: &str = "new";

/// 部分编辑参数
pub const PARTIAL_EDIT_PARAMS: &[&str] = &["section", "prependtext", "appendtext"];

/// 去除末尾空白的时机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimOrder {
    /// 先去除章节文本的末尾空白，再写回文档
    #[default]
    BeforeReplace,
    /// 先写回文档，再去除整个文档的末尾空白
    AfterReplace,
}

/// 请求中的 section 参数
#[derive(Debug, Clone, PartialEq, Eq)]
enum SectionParam<'a> {
    New,
    Index(&'a str),
}

impl<'a> SectionParam<'a> {
    fn parse(request: &'a EditRequest) -> Option<Self> {
        let value = request.get("section").filter(|v| !v.is_empty())?;
        Some(if value == NEW_SECTION {
            SectionParam::New
        } else {
            SectionParam::Index(value)
        })
    }
}

/// 待审核编辑请求改写器
///
/// # 使用示例
///
/// ```rust
/// use moderation_hooks::{EditRequest, PendingEditRewriter, PendingRevision, Target};
///
/// let lookup = |target: &Target| Some(PendingRevision::new(target.clone(), "Pending text"));
/// let rewriter = PendingEditRewriter::new(&lookup);
///
/// let request = EditRequest::from_pairs([
///     ("action", "edit"),
///     ("title", "Foo"),
///     ("appendtext", "\nMore"),
/// ]);
/// let rewritten = rewriter.rewrite(&request).unwrap();
/// assert_eq!(rewritten.get("text"), Some("Pending text\nMore"));
/// assert!(!rewritten.contains("appendtext"));
/// ```
pub struct PendingEditRewriter<'a> {
    store: &'a dyn PendingStore,
    directory: &'a dyn PageDirectory,
    trim_order: TrimOrder,
}

impl<'a> PendingEditRewriter<'a> {
    /// 创建改写器，不解析 pageid
    pub fn new(store: &'a dyn PendingStore) -> Self {
        Self {
            store,
            directory: &NoPageDirectory,
            trim_order: TrimOrder::default(),
        }
    }

    /// 使用页面目录解析 pageid
    pub fn with_directory(mut self, directory: &'a dyn PageDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_trim_order(mut self, trim_order: TrimOrder) -> Self {
        self.trim_order = trim_order;
        self
    }

    /// 改写编辑请求
    ///
    /// # 返回
    /// - 不需要改写时返回原请求的副本
    /// - 改写后的请求包含完整的 `text`，不再包含 `section`/`prependtext`/`appendtext`
    ///
    /// # 错误
    /// 待审核修订中不存在指定章节时返回 `NoSuchSection`，传入的请求不受影响
    pub fn rewrite(&self, request: &EditRequest) -> Result<EditRequest, ModerationError> {
        if !request.is_edit() {
            return Ok(request.clone());
        }

        let has_partial = PARTIAL_EDIT_PARAMS
            .iter()
            .any(|key| is_present(request.get(key)));
        if !has_partial {
            // 普通的 action=edit&text= 不需要改写
            return Ok(request.clone());
        }

        let Some(target) = resolve_request_target(request, self.directory) else {
            tracing::debug!("edit request target unresolved, leaving request unchanged");
            return Ok(request.clone());
        };

        let Some(pending) = self.store.load_pending(&target) else {
            tracing::debug!(target = %target, "no pending revision, leaving request unchanged");
            return Ok(request.clone());
        };

        let text = self.compose_text(request, &target, &pending)?;

        let mut rewritten = request.clone();
        for key in PARTIAL_EDIT_PARAMS {
            rewritten.remove(key);
        }
        rewritten.set("text", text);

        tracing::debug!(
            target = %target,
            pending_id = ?pending.id,
            section = request.get("section"),
            "rewrote partial edit against pending revision"
        );
        Ok(rewritten)
    }

    /// 基于待审核文本计算最终的 `text`
    fn compose_text(
        &self,
        request: &EditRequest,
        target: &Target,
        pending: &PendingRevision,
    ) -> Result<String, ModerationError> {
        let editor = target.content_model().editor();
        let section = SectionParam::parse(request);

        let section_index = match section {
            Some(SectionParam::Index(value)) => {
                let index = value.trim().parse::<usize>().ok();
                let extracted = index.and_then(|i| Some((i, editor.extract_section(&pending.text, i)?)));
                match extracted {
                    Some(found) => Some(found),
                    None => {
                        tracing::warn!(target = %target, section = value, "section missing from pending revision");
                        return Err(ModerationError::NoSuchSection(value.to_string()));
                    }
                }
            }
            _ => None,
        };

        let starting_content = match (&section, &section_index) {
            (Some(SectionParam::New), _) => "",
            (_, Some((_, content))) => content.as_str(),
            _ => pending.text.as_str(),
        };

        let explicit = request.get("text");
        let new_text = match explicit {
            Some(text) => text.to_string(),
            None => {
                let combined = format!(
                    "{}{}{}",
                    request.get_or_empty("prependtext"),
                    starting_content,
                    request.get_or_empty("appendtext")
                );
                match self.trim_order {
                    TrimOrder::BeforeReplace => trim_trailing_whitespace(&combined).to_string(),
                    TrimOrder::AfterReplace if section_index.is_none() => {
                        trim_trailing_whitespace(&combined).to_string()
                    }
                    TrimOrder::AfterReplace => combined,
                }
            }
        };

        let Some((index, _)) = section_index else {
            return Ok(new_text);
        };

        let document = editor
            .replace_section(&pending.text, index, &new_text)
            .ok_or_else(|| ModerationError::NoSuchSection(index.to_string()))?;

        Ok(match (self.trim_order, explicit) {
            (TrimOrder::AfterReplace, None) => trim_trailing_whitespace(&document).to_string(),
            _ => document,
        })
    }
}

/// 使用默认设置改写请求
///
/// 等价于 `PendingEditRewriter::new(lookup).rewrite(request)`。
pub fn rewrite(
    request: &EditRequest,
    lookup: &dyn PendingStore,
) -> Result<EditRequest, ModerationError> {
    PendingEditRewriter::new(lookup).rewrite(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PENDING_TEXT: &str = "Intro\n\n== A ==\nOld A text";

    fn pending_lookup(target: &Target) -> Option<PendingRevision> {
        (target.title == "Foo").then(|| PendingRevision::new(target.clone(), PENDING_TEXT))
    }

    fn no_pending(_target: &Target) -> Option<PendingRevision> {
        None
    }

    fn edit_request(pairs: &[(&str, &str)]) -> EditRequest {
        let mut request = EditRequest::from_pairs([("action", "edit"), ("title", "Foo")]);
        for (k, v) in pairs {
            request.set(*k, *v);
        }
        request
    }

    #[test]
    fn test_plain_text_edit_is_identity() {
        let request = edit_request(&[("text", "Whole new text")]);
        assert_eq!(rewrite(&request, &pending_lookup).unwrap(), request);
    }

    #[test]
    fn test_non_edit_action_is_identity() {
        let request = EditRequest::from_pairs([("action", "query"), ("appendtext", "x")]);
        assert_eq!(rewrite(&request, &pending_lookup).unwrap(), request);
    }

    #[test]
    fn test_empty_partial_params_are_absent() {
        let request = edit_request(&[("section", ""), ("appendtext", "")]);
        assert_eq!(rewrite(&request, &pending_lookup).unwrap(), request);
    }

    #[test]
    fn test_no_pending_revision_is_identity() {
        let request = edit_request(&[("appendtext", " more"), ("section", "1")]);
        assert_eq!(rewrite(&request, &no_pending).unwrap(), request);
    }

    #[test]
    fn test_append_to_pending_text() {
        let request = edit_request(&[("appendtext", "\nAppended\n\n")]);
        let rewritten = rewrite(&request, &pending_lookup).unwrap();
        assert_eq!(
            rewritten.get("text"),
            Some("Intro\n\n== A ==\nOld A text\nAppended")
        );
        assert!(!rewritten.contains("appendtext"));
        assert_eq!(rewritten.get("title"), Some("Foo"));
    }

    #[test]
    fn test_prepend_and_append() {
        let request = edit_request(&[("prependtext", "Top\n"), ("appendtext", "\nBottom")]);
        let rewritten = rewrite(&request, &pending_lookup).unwrap();
        assert_eq!(
            rewritten.get("text"),
            Some("Top\nIntro\n\n== A ==\nOld A text\nBottom")
        );
        assert!(!rewritten.contains("prependtext"));
    }

    #[test]
    fn test_new_section_uses_only_prepend_and_append() {
        let request = edit_request(&[
            ("section", "new"),
            ("prependtext", "Hello "),
            ("appendtext", "world  \n"),
        ]);
        let rewritten = rewrite(&request, &pending_lookup).unwrap();
        assert_eq!(rewritten.get("text"), Some("Hello world"));
        assert!(!rewritten.contains("section"));
    }

    #[test]
    fn test_missing_section_fails() {
        let request = edit_request(&[("section", "5"), ("appendtext", "x")]);
        let err = rewrite(&request, &pending_lookup).unwrap_err();
        assert!(matches!(err, ModerationError::NoSuchSection(ref s) if s == "5"));
        // 原请求保持不变
        assert_eq!(request.get("section"), Some("5"));
        assert_eq!(request.get("appendtext"), Some("x"));
    }

    #[test]
    fn test_non_numeric_section_fails() {
        let request = edit_request(&[("section", "T-1")]);
        let err = rewrite(&request, &pending_lookup).unwrap_err();
        assert_eq!(err.code(), "nosuchsection");
    }

    #[test]
    fn test_explicit_text_wins_over_prepend_append() {
        let request = edit_request(&[
            ("text", "Explicit text  \n"),
            ("prependtext", "ignored"),
            ("appendtext", "ignored"),
        ]);
        let rewritten = rewrite(&request, &pending_lookup).unwrap();
        assert_eq!(rewritten.get("text"), Some("Explicit text  \n"));
        assert!(!rewritten.contains("prependtext"));
        assert!(!rewritten.contains("appendtext"));
    }

    #[test]
    fn test_section_scenario_trim_before_replace() {
        let request = edit_request(&[("section", "1"), ("prependtext", "New: ")]);
        let rewritten = rewrite(&request, &pending_lookup).unwrap();
        assert_eq!(rewritten.get("text"), Some("Intro\n\n== A ==\nNew: Old A text"));
        assert!(!rewritten.contains("section"));
        assert!(!rewritten.contains("prependtext"));
    }

    #[test]
    fn test_section_scenario_trim_after_replace() {
        let lookup = pending_lookup;
        let rewriter = PendingEditRewriter::new(&lookup).with_trim_order(TrimOrder::AfterReplace);
        let request = edit_request(&[("section", "1"), ("prependtext", "New: "), ("appendtext", "\n\n")]);
        let rewritten = rewriter.rewrite(&request).unwrap();
        assert_eq!(rewritten.get("text"), Some("Intro\n\n== A ==\nNew: Old A text"));
    }

    #[test]
    fn test_section_scenario_exact_trim_after_replace() {
        let lookup = pending_lookup;
        let rewriter = PendingEditRewriter::new(&lookup).with_trim_order(TrimOrder::AfterReplace);
        let request = edit_request(&[("section", "1"), ("prependtext", "New: ")]);
        let rewritten = rewriter.rewrite(&request).unwrap();
        assert_eq!(rewritten.get("text"), Some("Intro\n\n== A ==\nNew: Old A text"));
        assert!(!rewritten.contains("section"));
        assert!(!rewritten.contains("prependtext"));
    }

    #[test]
    fn test_trailing_nbsp_is_not_trimmed() {
        let lookup = |target: &Target| Some(PendingRevision::new(target.clone(), "Pending"));
        let request = edit_request(&[("appendtext", " 1\u{a0}000\u{a0}\n ")]);
        let rewritten = rewrite(&request, &lookup).unwrap();
        assert_eq!(rewritten.get("text"), Some("Pending 1\u{a0}000\u{a0}"));

        let ideographic = edit_request(&[("appendtext", "。\u{3000}\t")]);
        let rewritten = rewrite(&ideographic, &lookup).unwrap();
        assert_eq!(rewritten.get("text"), Some("Pending。\u{3000}"));
    }

    #[test]
    fn test_lead_section() {
        let request = edit_request(&[("section", "0"), ("appendtext", " extended")]);
        let rewritten = rewrite(&request, &pending_lookup).unwrap();
        assert_eq!(
            rewritten.get("text"),
            Some("Intro extended\n\n== A ==\nOld A text")
        );
    }

    #[test]
    fn test_explicit_text_replaces_section() {
        let request = edit_request(&[("section", "1"), ("text", "Replacement")]);
        let rewritten = rewrite(&request, &pending_lookup).unwrap();
        assert_eq!(rewritten.get("text"), Some("Intro\n\n== A ==\nReplacement"));
    }

    #[test]
    fn test_code_page_has_no_sections() {
        let lookup = |target: &Target| Some(PendingRevision::new(target.clone(), "body {}"));
        let request = EditRequest::from_pairs([
            ("action", "edit"),
            ("title", "User:Someone/common.css"),
            ("section", "1"),
        ]);
        assert!(matches!(
            rewrite(&request, &lookup),
            Err(ModerationError::NoSuchSection(_))
        ));

        let append = EditRequest::from_pairs([
            ("action", "edit"),
            ("title", "User:Someone/common.css"),
            ("appendtext", "\na {}"),
        ]);
        assert_eq!(rewrite(&append, &lookup).unwrap().get("text"), Some("body {}\na {}"));
    }

    #[test]
    fn test_pageid_resolution() {
        let lookup = pending_lookup;
        let directory = |id: u64| (id == 3).then(|| Target::new(0, "Foo"));
        let rewriter = PendingEditRewriter::new(&lookup).with_directory(&directory);

        let request = EditRequest::from_pairs([("action", "edit"), ("pageid", "3"), ("appendtext", "!")]);
        let rewritten = rewriter.rewrite(&request).unwrap();
        assert_eq!(rewritten.get("text"), Some("Intro\n\n== A ==\nOld A text!"));

        // 没有页面目录时 pageid 无法解析，请求保持不变
        assert_eq!(rewrite(&request, &lookup).unwrap(), request);
    }
}
