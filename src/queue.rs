/// 审核队列访问模块
///
/// 该模块定义了待审核修订的只读查询接口，改写器和预览通过它访问队列。
/// 遵循依赖倒置原则，宿主可以替换为数据库实现，测试可以直接传入闭包。
///
/// # 架构设计
///
/// - **traits**: 定义 PendingStore/PageDirectory trait 接口
/// - **memory**: 基于内存（可从 JSON 加载）的默认实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use moderation_hooks::queue::{MemoryQueue, PendingStore};
///
/// let queue = MemoryQueue::load(Path::new("queue.json"))?;
/// let pending = queue.for_author("Alice").load_pending(&target);
/// ```
pub mod traits;
pub mod memory;

// === 导出 trait 定义 ===
pub use traits::{NoPageDirectory, PageDirectory, PendingRevision, PendingStore};

// === 导出默认实现 ===
pub use memory::{AuthorView, MemoryQueue, QueuedEdit};
