/// Wikitext 章节编辑器
///
/// 章节由 `={1,6}标题={1,6}` 形式的标题行划分，级别取两侧等号数量的较小值。
/// 注释、`<nowiki>`、`<pre>` 以及代码高亮块中的标题行不计入章节。

use super::{SectionEditor, SectionHeading};
use crate::utils::trim_trailing_whitespace;

/// 最大标题级别
const MAX_HEADING_LEVEL: usize = 6;

/// 会屏蔽标题解析的块标签（开始标签前缀, 结束标签）
const VERBATIM_TAGS: &[(&str, &str)] = &[
    ("<nowiki", "</nowiki>"),
    ("<pre", "</pre>"),
    ("<source", "</source>"),
    ("<syntaxhighlight", "</syntaxhighlight>"),
];

/// 章节之间的分隔符
const SECTION_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct WikitextEditor;

/// 文档中的一个标题行
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeadingLine {
    level: usize,
    title: String,
    /// 标题行起始字节偏移
    start: usize,
    /// 标题行之后（正文开始）的字节偏移
    body_start: usize,
}

/// 行扫描状态
#[derive(Debug, Default)]
struct BlockState {
    in_comment: bool,
    /// 当前所在块的结束标签
    closing_tag: Option<&'static str>,
}

impl BlockState {
    fn is_inside_block(&self) -> bool {
        self.in_comment || self.closing_tag.is_some()
    }

    /// 扫描一行文本，更新注释/块状态
    fn advance(&mut self, line: &str) {
        // ASCII 小写化保持字节偏移不变
        let lower = line.to_ascii_lowercase();
        let mut pos = 0;

        while pos < lower.len() {
            let rest = &lower[pos..];

            if self.in_comment {
                match rest.find("-->") {
                    Some(idx) => {
                        self.in_comment = false;
                        pos += idx + 3;
                    }
                    None => return,
                }
                continue;
            }

            if let Some(closing) = self.closing_tag {
                match rest.find(closing) {
                    Some(idx) => {
                        self.closing_tag = None;
                        pos += idx + closing.len();
                    }
                    None => return,
                }
                continue;
            }

            let comment = rest.find("<!--").map(|idx| (idx, None));
            let tag = VERBATIM_TAGS
                .iter()
                .filter_map(|&(open, close)| {
                    rest.match_indices(open)
                        .map(|(idx, _)| idx)
                        .find(|&idx| is_tag_boundary(rest, idx + open.len()))
                        .map(|idx| (idx, Some((open, close))))
                })
                .min_by_key(|&(idx, _)| idx);

            let next = match (comment, tag) {
                (Some(c), Some(t)) => Some(if c.0 <= t.0 { c } else { t }),
                (c, t) => c.or(t),
            };

            match next {
                None => return,
                Some((idx, None)) => {
                    self.in_comment = true;
                    pos += idx + 4;
                }
                Some((idx, Some((open, close)))) => {
                    let after_name = idx + open.len();
                    match rest[after_name..].find('>') {
                        Some(gt) => {
                            let tag_end = after_name + gt;
                            // 自闭合标签不开启块
                            if !rest[..tag_end].ends_with('/') {
                                self.closing_tag = Some(close);
                            }
                            pos += tag_end + 1;
                        }
                        None => pos += after_name,
                    }
                }
            }
        }
    }
}

/// 标签名之后必须是空白、`>` 或 `/`，避免 `<prefix>` 被当作 `<pre`
fn is_tag_boundary(text: &str, idx: usize) -> bool {
    match text[idx..].chars().next() {
        None => true,
        Some(c) => c == '>' || c == '/' || c.is_whitespace(),
    }
}

/// 去掉标题行末尾的注释，如 `== A ==<!-- note -->`
fn strip_trailing_comments(line: &str) -> &str {
    let mut line = line.trim_end();
    while line.ends_with("-->") {
        match line.rfind("<!--") {
            Some(idx) => line = line[..idx].trim_end(),
            None => break,
        }
    }
    line
}

/// 解析标题行，返回（级别, 标题文本）
fn parse_heading(line: &str) -> Option<(usize, String)> {
    let trimmed = strip_trailing_comments(line);
    if !trimmed.starts_with('=') || !trimmed.ends_with('=') {
        return None;
    }

    let leading = trimmed.chars().take_while(|&c| c == '=').count();
    if leading == trimmed.len() {
        // 整行都是等号
        return None;
    }
    let trailing = trimmed.chars().rev().take_while(|&c| c == '=').count();
    let level = leading.min(trailing).min(MAX_HEADING_LEVEL);

    let inner = &trimmed[level..trimmed.len() - level];
    if inner.is_empty() {
        return None;
    }

    Some((level, inner.trim().to_string()))
}

/// 查找文档中所有有效的标题行
fn find_headings(text: &str) -> Vec<HeadingLine> {
    let mut headings = Vec::new();
    let mut state = BlockState::default();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if !state.is_inside_block() {
            let content = line.trim_end_matches(|c| c == '\n' || c == '\r');
            if let Some((level, title)) = parse_heading(content) {
                headings.push(HeadingLine {
                    level,
                    title,
                    start: offset,
                    body_start: offset + line.len(),
                });
            }
        }

        state.advance(line);
        offset += line.len();
    }

    headings
}

/// 章节在文档中的字节范围
struct SectionSpan {
    /// 保留的前缀（导言为空，其他章节包含标题行）
    prefix_end: usize,
    /// 正文结束位置（下一个同级或更高级标题的起点）
    end: usize,
}

fn locate_section(text: &str, headings: &[HeadingLine], index: usize) -> Option<SectionSpan> {
    if index == 0 {
        let end = headings.first().map(|h| h.start).unwrap_or(text.len());
        return Some(SectionSpan { prefix_end: 0, end });
    }

    let heading = headings.get(index - 1)?;
    let end = headings[index..]
        .iter()
        .find(|h| h.level <= heading.level)
        .map(|h| h.start)
        .unwrap_or(text.len());

    Some(SectionSpan {
        prefix_end: heading.body_start,
        end,
    })
}

impl SectionEditor for WikitextEditor {
    fn extract_section(&self, text: &str, index: usize) -> Option<String> {
        let headings = find_headings(text);
        let span = locate_section(text, &headings, index)?;
        Some(trim_trailing_whitespace(&text[span.prefix_end..span.end]).to_string())
    }

    fn replace_section(&self, text: &str, index: usize, new_content: &str) -> Option<String> {
        let headings = find_headings(text);
        let span = locate_section(text, &headings, index)?;

        let prefix = &text[..span.prefix_end];
        let rest = &text[span.end..];
        let body = trim_trailing_whitespace(new_content);

        let mut output = String::with_capacity(text.len() + new_content.len());
        output.push_str(prefix);

        if !body.is_empty() {
            // 标题行位于文档末尾且没有换行
            if !prefix.is_empty() && !prefix.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(if rest.is_empty() { new_content } else { body });
            if !rest.is_empty() {
                output.push_str(SECTION_SEPARATOR);
            }
        }

        output.push_str(rest);
        Some(output)
    }

    fn sections(&self, text: &str) -> Vec<SectionHeading> {
        find_headings(text)
            .into_iter()
            .enumerate()
            .map(|(i, h)| SectionHeading {
                index: i + 1,
                level: h.level,
                title: h.title,
            })
            .collect()
    }
}
