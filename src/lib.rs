pub mod config;
pub mod gate;
pub mod preview;
pub mod queue;
pub mod request;
pub mod rewriter;
pub mod section;
pub mod title;
pub mod utils;

// 重新导出主要结构
pub use config::ModerationConfig;
pub use gate::{BypassPolicy, User};
pub use preview::{preview, Preview};
pub use queue::{MemoryQueue, PageDirectory, PendingRevision, PendingStore, QueuedEdit};
pub use request::EditRequest;
pub use rewriter::{rewrite, PendingEditRewriter, TrimOrder};
pub use section::{ContentModel, SectionEditor};
pub use title::Target;
pub use utils::{ApiError, ModerationError};
