//! 重构建议子控制器
//!
//! 按需为单个代码片段获取改进建议，与主问答流程互不阻塞。
//! 每次请求分配递增序号，只有仍是最新序号的结果才会显示。

use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::notify::{Notification, NotificationSink};
use crate::gateway::Gateway;
use crate::models::{FileReference, RefactorSuggestion};
use crate::state::InFlight;

/// 单次请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefactorOutcome {
    /// 片段为空，未发起请求
    Skipped,
    /// 建议已显示
    Applied(usize),
    /// 请求失败，原有建议保持不变
    Failed,
    /// 已有更新的请求，结果被丢弃
    Superseded,
}

/// 重构建议子控制器
pub struct RefactorController {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn NotificationSink>,
    default_language: String,
    suggestions: RwLock<Option<Vec<RefactorSuggestion>>>,
    latest_seq: AtomicU64,
    in_flight: AtomicUsize,
}

impl RefactorController {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn NotificationSink>,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            default_language: default_language.into(),
            suggestions: RwLock::new(None),
            latest_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// 为代码片段请求重构建议
    pub async fn request(&self, snippet: &str, language: &str) -> RefactorOutcome {
        if snippet.trim().is_empty() {
            debug!("Refactor skipped: empty snippet");
            return RefactorOutcome::Skipped;
        }

        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = {
            let _guard = InFlight::enter(&self.in_flight);
            self.gateway.refactor(snippet, language).await
        };

        if self.latest_seq.load(Ordering::SeqCst) != seq {
            debug!("Refactor result #{} superseded", seq);
            return RefactorOutcome::Superseded;
        }

        match result {
            Ok(suggestions) => {
                let count = suggestions.len();
                *self.suggestions.write() = Some(suggestions);
                self.notifier
                    .notify(Notification::success("Refactor suggestions ready"));
                RefactorOutcome::Applied(count)
            }
            Err(e) => {
                warn!("Refactor request #{} failed: {}", seq, e);
                self.notifier
                    .notify(Notification::error("Failed to generate suggestions"));
                RefactorOutcome::Failed
            }
        }
    }

    /// 为答案中的文件引用请求建议，语言由扩展名推断
    pub async fn request_for_reference(&self, reference: &FileReference) -> RefactorOutcome {
        let language = language_for_path(&reference.file).unwrap_or(self.default_language.as_str());
        self.request(&reference.snippet, language).await
    }

    /// 当前显示的建议
    pub fn suggestions(&self) -> Option<Vec<RefactorSuggestion>> {
        self.suggestions.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// 清空建议，并使在途请求的结果失效
    pub fn clear(&self) {
        self.latest_seq.fetch_add(1, Ordering::SeqCst);
        *self.suggestions.write() = None;
    }
}

/// 根据文件扩展名推断语言
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let ext = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_lowercase();

    let language = match ext.as_str() {
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "rb" => "ruby",
        "php" => "php",
        "cs" => "csharp",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "swift" => "swift",
        "scala" => "scala",
        "sh" | "bash" => "bash",
        _ => return None,
    };
    Some(language)
}
