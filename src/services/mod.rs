//! 服务层模块
//!
//! 问答会话的核心：会话控制器、历史缓存、图表渲染、重构建议，
//! 以及代码库目录和健康检查这两个独立的辅助视图。

pub mod codebases;
pub mod diagram;
pub mod draft;
pub mod health;
pub mod history;
pub mod notify;
pub mod refactor;
pub mod session;

pub use codebases::{filter_codebases, CodebaseDirectory};
pub use diagram::{DiagramBackend, DiagramRenderer, DiagramState, MermaidTextBackend, RenderFailure};
pub use draft::{tokenize_tags, QuestionDraft};
pub use health::{check_health, HealthMonitor};
pub use history::{HistoryCache, RefreshOutcome};
pub use notify::{ChannelSink, Notification, NotificationSink, Severity};
pub use refactor::{language_for_path, RefactorController, RefactorOutcome};
pub use session::{SessionController, SubmitOutcome};
