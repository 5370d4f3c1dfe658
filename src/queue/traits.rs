/// 审核队列访问层 - trait 定义
///
/// 改写器只读取队列，从不创建、修改或持久化待审核修订。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::title::Target;

/// 待审核修订快照
///
/// 表示某个目标最近一次排队但尚未生效的编辑。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRevision {
    /// 编辑目标
    pub target: Target,
    /// 待审核修订的完整文本
    pub text: String,
    /// 队列中的编号
    #[serde(default)]
    pub id: Option<u64>,
    /// 提交者
    #[serde(default)]
    pub author: Option<String>,
    /// 提交时间
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl PendingRevision {
    /// 创建只包含目标和文本的快照
    pub fn new(target: Target, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
            id: None,
            author: None,
            timestamp: None,
        }
    }
}

/// 待审核修订查询 trait
///
/// # 职责
/// - 按目标查询最近的待审核修订
/// - 只读，不负责写入队列
///
/// # 实现示例
/// ```rust,ignore
/// let lookup = |target: &Target| queue.get(target).cloned();
/// let rewriter = PendingEditRewriter::new(&lookup);
/// ```
pub trait PendingStore {
    /// 查询目标的待审核修订
    ///
    /// # 返回
    /// 没有待审核修订时返回 None
    fn load_pending(&self, target: &Target) -> Option<PendingRevision>;
}

impl<F> PendingStore for F
where
    F: Fn(&Target) -> Option<PendingRevision>,
{
    fn load_pending(&self, target: &Target) -> Option<PendingRevision> {
        self(target)
    }
}

/// 页面目录 trait
///
/// # 职责
/// - 把请求中的 `pageid` 解析为编辑目标
pub trait PageDirectory {
    fn resolve_page_id(&self, page_id: u64) -> Option<Target>;
}

impl<F> PageDirectory for F
where
    F: Fn(u64) -> Option<Target>,
{
    fn resolve_page_id(&self, page_id: u64) -> Option<Target> {
        self(page_id)
    }
}

/// 不认识任何页面 id 的目录
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPageDirectory;

impl PageDirectory for NoPageDirectory {
    fn resolve_page_id(&self, _page_id: u64) -> Option<Target> {
        None
    }
}
