/// 审核队列访问层 - 内存实现
///
/// 队列内容可以从 JSON 文件加载，格式为编辑记录数组：
///
/// ```json
/// [
///   { "id": 1, "author": "Alice", "namespace": 0, "title": "Foo",
///     "text": "...", "timestamp": "2024-05-01T12:00:00Z", "page_id": 12 }
/// ]
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::traits::{PageDirectory, PendingRevision, PendingStore};
use crate::title::Target;
use crate::utils::ModerationError;

/// 队列中的一条编辑记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedEdit {
    /// 队列编号
    pub id: u64,
    /// 提交者用户名
    pub author: String,
    /// 命名空间 id
    #[serde(default)]
    pub namespace: i32,
    /// 标题（不含命名空间前缀）
    pub title: String,
    /// 待审核的完整文本
    pub text: String,
    /// 提交时间
    pub timestamp: DateTime<Utc>,
    /// 已存在页面的 id（新建页面没有）
    #[serde(default)]
    pub page_id: Option<u64>,
}

impl QueuedEdit {
    /// 编辑目标
    pub fn target(&self) -> Target {
        Target::new(self.namespace, &self.title)
    }

    /// 转换为待审核修订快照
    pub fn to_pending(&self) -> PendingRevision {
        PendingRevision {
            target: self.target(),
            text: self.text.clone(),
            id: Some(self.id),
            author: Some(self.author.clone()),
            timestamp: Some(self.timestamp),
        }
    }

    /// 排序键：时间优先，其次编号
    fn recency(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.id)
    }
}

/// 内存审核队列
///
/// 加载后只读，`load_pending` 返回目标最新的一条编辑。
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    edits: Vec<QueuedEdit>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从编辑记录构造队列
    ///
    /// # 错误
    /// 标题规范化后为空时返回 `InvalidTitle`
    pub fn from_edits(edits: Vec<QueuedEdit>) -> Result<Self, ModerationError> {
        let mut queue = Self::new();
        for edit in edits {
            queue.push(edit)?;
        }
        Ok(queue)
    }

    /// 从 JSON 字符串加载
    pub fn from_json(json: &str) -> Result<Self, ModerationError> {
        let edits: Vec<QueuedEdit> = serde_json::from_str(json)?;
        Self::from_edits(edits)
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self, ModerationError> {
        let json = std::fs::read_to_string(path)?;
        let queue = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), edits = queue.len(), "loaded moderation queue");
        Ok(queue)
    }

    /// 添加一条编辑记录
    pub fn push(&mut self, edit: QueuedEdit) -> Result<(), ModerationError> {
        if edit.target().title.is_empty() {
            return Err(ModerationError::InvalidTitle(edit.title));
        }
        self.edits.push(edit);
        Ok(())
    }

    /// 按编号查找编辑
    pub fn find(&self, id: u64) -> Option<&QueuedEdit> {
        self.edits.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedEdit> {
        self.edits.iter()
    }

    /// 只包含指定作者编辑的视图
    pub fn for_author<'a>(&'a self, author: &'a str) -> AuthorView<'a> {
        AuthorView {
            queue: self,
            author,
        }
    }

    fn newest_matching<P>(&self, target: &Target, predicate: P) -> Option<PendingRevision>
    where
        P: Fn(&QueuedEdit) -> bool,
    {
        self.edits
            .iter()
            .filter(|&e| predicate(e) && e.target() == *target)
            .max_by_key(|e| e.recency())
            .map(QueuedEdit::to_pending)
    }
}

impl PendingStore for MemoryQueue {
    fn load_pending(&self, target: &Target) -> Option<PendingRevision> {
        self.newest_matching(target, |_| true)
    }
}

impl PageDirectory for MemoryQueue {
    fn resolve_page_id(&self, page_id: u64) -> Option<Target> {
        self.edits
            .iter()
            .find(|e| e.page_id == Some(page_id))
            .map(QueuedEdit::target)
    }
}

/// 按作者过滤的队列视图
///
/// 预加载只针对当前用户自己的待审核编辑。
#[derive(Debug, Clone, Copy)]
pub struct AuthorView<'a> {
    queue: &'a MemoryQueue,
    author: &'a str,
}

impl PendingStore for AuthorView<'_> {
    fn load_pending(&self, target: &Target) -> Option<PendingRevision> {
        self.queue.newest_matching(target, |e| e.author == self.author)
    }
}

impl PageDirectory for AuthorView<'_> {
    fn resolve_page_id(&self, page_id: u64) -> Option<Target> {
        self.queue.resolve_page_id(page_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn edit(id: u64, author: &str, title: &str, text: &str, hour: u32) -> QueuedEdit {
        QueuedEdit {
            id,
            author: author.to_string(),
            namespace: 0,
            title: title.to_string(),
            text: text.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            page_id: None,
        }
    }

    fn create_test_queue() -> MemoryQueue {
        MemoryQueue::from_edits(vec![
            edit(1, "Alice", "Foo", "alice old", 10),
            edit(2, "Bob", "Foo", "bob newest", 12),
            edit(3, "Alice", "Foo", "alice new", 11),
            edit(4, "Alice", "Bar", "bar text", 9),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_pending_returns_newest() {
        let queue = create_test_queue();
        let pending = queue.load_pending(&Target::new(0, "Foo")).unwrap();
        assert_eq!(pending.text, "bob newest");
        assert_eq!(pending.id, Some(2));
    }

    #[test]
    fn test_author_view() {
        let queue = create_test_queue();
        let alice = queue.for_author("Alice");
        let pending = alice.load_pending(&Target::new(0, "Foo")).unwrap();
        assert_eq!(pending.text, "alice new");
        assert_eq!(pending.author.as_deref(), Some("Alice"));

        assert!(queue.for_author("Carol").load_pending(&Target::new(0, "Foo")).is_none());
    }

    #[test]
    fn test_title_normalization_matches() {
        let queue = MemoryQueue::from_edits(vec![edit(1, "Alice", "foo_bar", "x", 1)]).unwrap();
        assert!(queue.load_pending(&Target::new(0, "Foo bar")).is_some());
        assert!(queue.load_pending(&Target::new(1, "Foo bar")).is_none());
    }

    #[test]
    fn test_same_timestamp_prefers_higher_id() {
        let queue = MemoryQueue::from_edits(vec![
            edit(8, "Alice", "Foo", "later id", 5),
            edit(7, "Alice", "Foo", "earlier id", 5),
        ])
        .unwrap();
        assert_eq!(queue.load_pending(&Target::new(0, "Foo")).unwrap().text, "later id");
    }

    #[test]
    fn test_find_and_page_directory() {
        let mut queue = create_test_queue();
        let mut with_page = edit(9, "Alice", "Baz", "baz", 1);
        with_page.page_id = Some(77);
        queue.push(with_page).unwrap();

        assert_eq!(queue.find(4).map(|e| e.title.as_str()), Some("Bar"));
        assert!(queue.find(100).is_none());
        assert_eq!(queue.resolve_page_id(77), Some(Target::new(0, "Baz")));
        assert_eq!(queue.for_author("Bob").resolve_page_id(77), Some(Target::new(0, "Baz")));
    }

    #[test]
    fn test_rejects_empty_title() {
        let result = MemoryQueue::from_edits(vec![edit(1, "Alice", " _ ", "x", 1)]);
        assert!(matches!(result, Err(ModerationError::InvalidTitle(_))));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": 5, "author": "Alice", "namespace": 1, "title": "Foo",
             "text": "talk text", "timestamp": "2024-05-01T12:00:00Z"}
        ]"#;
        let queue = MemoryQueue::from_json(json).unwrap();
        assert_eq!(queue.len(), 1);
        let pending = queue.load_pending(&Target::new(1, "Foo")).unwrap();
        assert_eq!(pending.text, "talk text");

        assert!(matches!(
            MemoryQueue::from_json("{not json"),
            Err(ModerationError::JsonError(_))
        ));
    }
}
