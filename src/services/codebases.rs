//! 代码库目录
//!
//! 全部代码库的列表，以及选中代码库的问答记录。与单个会话的历史缓存是两个独立的聚合。

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::notify::{Notification, NotificationSink};
use crate::gateway::Gateway;
use crate::models::{CodebaseSummary, HistoryRecord};
use crate::state::InFlight;

/// 按名称过滤（不区分大小写的子串匹配，空查询匹配全部）
pub fn filter_codebases<'a>(codebases: &'a [CodebaseSummary], query: &str) -> Vec<&'a CodebaseSummary> {
    let query = query.to_lowercase();
    codebases
        .iter()
        .filter(|cb| cb.name.to_lowercase().contains(&query))
        .collect()
}

/// 代码库目录
pub struct CodebaseDirectory {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn NotificationSink>,
    codebases: RwLock<Vec<CodebaseSummary>>,
    loading: AtomicUsize,
    selected: RwLock<Option<(u64, String)>>,
    selection_seq: AtomicU64,
    questions: RwLock<Vec<HistoryRecord>>,
}

impl CodebaseDirectory {
    pub fn new(gateway: Arc<dyn Gateway>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            gateway,
            notifier,
            codebases: RwLock::new(Vec::new()),
            loading: AtomicUsize::new(0),
            selected: RwLock::new(None),
            selection_seq: AtomicU64::new(0),
            questions: RwLock::new(Vec::new()),
        }
    }

    /// 加载全部代码库，返回条目数
    pub async fn load(&self) -> usize {
        let result = {
            let _guard = InFlight::enter(&self.loading);
            self.gateway.fetch_all_codebases().await
        };

        match result {
            Ok(codebases) => {
                let count = codebases.len();
                *self.codebases.write() = codebases;
                count
            }
            Err(e) => {
                warn!("Failed to load codebases: {}", e);
                self.codebases.write().clear();
                self.notifier.notify(Notification::error("Failed to load codebases"));
                0
            }
        }
    }

    /// 选中代码库并加载其问答记录
    ///
    /// 返回 `false` 表示本次选择已被更新的选择取代。
    pub async fn select(&self, codebase_id: &str) -> bool {
        let seq = self.selection_seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.selected.write() = Some((seq, codebase_id.to_string()));
        self.questions.write().clear();

        let result = self.gateway.fetch_history(codebase_id).await;

        let current = matches!(&*self.selected.read(), Some((s, _)) if *s == seq);
        if !current {
            debug!("Discarding questions for superseded selection {}", codebase_id);
            return false;
        }

        match result {
            Ok(records) => *self.questions.write() = records,
            Err(e) => {
                warn!("Failed to load questions for {}: {}", codebase_id, e);
                self.notifier.notify(Notification::error("Failed to load questions"));
            }
        }
        true
    }

    pub fn codebases(&self) -> Vec<CodebaseSummary> {
        self.codebases.read().clone()
    }

    /// 按名称过滤当前列表
    pub fn filtered(&self, query: &str) -> Vec<CodebaseSummary> {
        let codebases = self.codebases.read();
        filter_codebases(&codebases, query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected.read().as_ref().map(|(_, id)| id.clone())
    }

    pub fn questions(&self) -> Vec<HistoryRecord> {
        self.questions.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }
}
