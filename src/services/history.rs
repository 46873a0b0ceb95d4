//! 历史问答缓存
//!
//! 服务端问答记录的本地只读副本。每次刷新整体替换，不做增量合并，
//! 也不重新排序。

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::notify::{Notification, NotificationSink};
use crate::gateway::Gateway;
use crate::models::HistoryRecord;
use crate::state::{InFlight, SessionScope, SessionToken};

/// 刷新结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// 列表已替换为服务端返回的条目数
    Replaced(usize),
    /// 请求失败，列表已清空
    Failed,
    /// 会话已切换，结果被丢弃
    Stale,
}

/// 历史问答缓存
pub struct HistoryCache {
    gateway: Arc<dyn Gateway>,
    scope: Arc<SessionScope>,
    notifier: Arc<dyn NotificationSink>,
    records: RwLock<Vec<HistoryRecord>>,
    in_flight: AtomicUsize,
}

impl HistoryCache {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        scope: Arc<SessionScope>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            gateway,
            scope,
            notifier,
            records: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// 刷新指定会话的历史
    ///
    /// 结果只在 `token` 仍是当前会话时落地。
    pub async fn refresh(&self, token: &SessionToken) -> RefreshOutcome {
        let result = {
            let _guard = InFlight::enter(&self.in_flight);
            self.gateway.fetch_history(&token.codebase_id).await
        };

        if !self.scope.is_current(token) {
            debug!(
                "Discarding stale history for codebase {} (epoch {})",
                token.codebase_id, token.epoch
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(records) => {
                let count = records.len();
                *self.records.write() = records;
                debug!("History refreshed: codebase={}, entries={}", token.codebase_id, count);
                RefreshOutcome::Replaced(count)
            }
            Err(e) => {
                warn!("Failed to load history for {}: {}", token.codebase_id, e);
                self.records.write().clear();
                self.notifier.notify(Notification::error("Failed to load history"));
                RefreshOutcome::Failed
            }
        }
    }

    /// 当前缓存的记录（服务端顺序）
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<HistoryRecord> {
        self.records.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// 会话结束时清空
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::{api_error, history_record, MockGateway};
    use crate::services::notify::RecordingSink;
    use std::time::Duration;

    struct Fixture {
        gateway: Arc<MockGateway>,
        scope: Arc<SessionScope>,
        sink: Arc<RecordingSink>,
        cache: Arc<HistoryCache>,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(MockGateway::new());
        let scope = Arc::new(SessionScope::new());
        let sink = Arc::new(RecordingSink::default());
        let cache = Arc::new(HistoryCache::new(
            gateway.clone(),
            scope.clone(),
            sink.clone(),
        ));
        Fixture {
            gateway,
            scope,
            sink,
            cache,
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_whole_list() {
        let f = fixture();
        let token = f.scope.enter("cb-1");

        f.gateway.history.push_ok(vec![history_record("a"), history_record("b")]);
        assert_eq!(f.cache.refresh(&token).await, RefreshOutcome::Replaced(2));

        // 服务端裁剪后本地同步缩短
        f.gateway.history.push_ok(vec![history_record("c")]);
        assert_eq!(f.cache.refresh(&token).await, RefreshOutcome::Replaced(1));

        let questions: Vec<_> = f.cache.records().into_iter().map(|r| r.question).collect();
        assert_eq!(questions, vec!["c"]);
        assert_eq!(*f.gateway.history_requests.lock(), vec!["cb-1", "cb-1"]);
    }

    #[tokio::test]
    async fn test_failure_clears_and_notifies() {
        let f = fixture();
        let token = f.scope.enter("cb-1");

        f.gateway.history.push_ok(vec![history_record("a")]);
        f.cache.refresh(&token).await;

        f.gateway.history.push_err(api_error(500, None));
        assert_eq!(f.cache.refresh(&token).await, RefreshOutcome::Failed);
        assert!(f.cache.is_empty());
        assert_eq!(f.sink.errors(), vec!["Failed to load history"]);
        assert_eq!(f.gateway.history.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_refresh_does_not_overwrite_new_session() {
        let f = fixture();
        let old = f.scope.enter("cb-old");

        let gate = f.gateway.history.gate();
        let cache = f.cache.clone();
        let pending = tokio::spawn(async move { cache.refresh(&old).await });
        tokio::task::yield_now().await;
        assert!(f.cache.is_loading());

        let new = f.scope.enter("cb-new");
        f.gateway.history.push_ok(vec![history_record("new question")]);
        assert_eq!(f.cache.refresh(&new).await, RefreshOutcome::Replaced(1));

        gate.send(Ok(vec![history_record("old 1"), history_record("old 2")]))
            .unwrap();
        assert_eq!(pending.await.unwrap(), RefreshOutcome::Stale);

        let records = f.cache.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "new question");
        assert!(!f.cache.is_loading());
    }

    #[tokio::test]
    async fn test_stale_failure_is_silent() {
        let f = fixture();
        let old = f.scope.enter("cb-old");
        f.scope.enter("cb-new");

        f.gateway.history.push_err(api_error(500, None));
        assert_eq!(f.cache.refresh(&old).await, RefreshOutcome::Stale);
        assert!(f.sink.all().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_refresh_clears_loading() {
        let f = fixture();
        let token = f.scope.enter("cb-1");

        let _gate = f.gateway.history.gate();
        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), f.cache.refresh(&token)).await;
        assert!(cancelled.is_err());
        assert!(!f.cache.is_loading());
    }

    #[tokio::test]
    async fn test_aborted_refresh_task_clears_loading() {
        let f = fixture();
        let token = f.scope.enter("cb-1");

        let _gate = f.gateway.history.gate();
        let cache = f.cache.clone();
        let pending = tokio::spawn(async move { cache.refresh(&token).await });
        tokio::task::yield_now().await;
        assert!(f.cache.is_loading());

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(!f.cache.is_loading());
    }
}
