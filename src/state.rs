//! 会话作用域
//!
//! 记录当前活动的代码库会话。所有与代码库相关的异步结果在落地前都要用
//! [`SessionScope::is_current`] 检查，过期的结果直接丢弃。

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// 一次代码库会话的标识
///
/// `epoch` 每次进入会话都递增，重新进入同一个代码库也会使旧请求失效。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub codebase_id: String,
    pub epoch: u64,
}

/// 当前会话
#[derive(Debug, Default)]
pub struct SessionScope {
    current: RwLock<Option<SessionToken>>,
    epoch: AtomicU64,
}

impl SessionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入代码库会话，返回新的令牌
    pub fn enter(&self, codebase_id: impl Into<String>) -> SessionToken {
        let token = SessionToken {
            codebase_id: codebase_id.into(),
            epoch: self.epoch.fetch_add(1, Ordering::SeqCst) + 1,
        };
        *self.current.write() = Some(token.clone());
        token
    }

    /// 离开当前会话
    pub fn leave(&self) -> Option<SessionToken> {
        self.current.write().take()
    }

    pub fn current(&self) -> Option<SessionToken> {
        self.current.read().clone()
    }

    /// 令牌是否仍对应当前会话
    pub fn is_current(&self, token: &SessionToken) -> bool {
        self.current.read().as_ref() == Some(token)
    }
}

/// 在途请求计数
///
/// 离开作用域时递减，请求 future 被取消时同样生效。
pub(crate) struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    pub(crate) fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_replaces_token() {
        let scope = SessionScope::new();
        let first = scope.enter("cb-1");
        let second = scope.enter("cb-2");

        assert!(!scope.is_current(&first));
        assert!(scope.is_current(&second));
        assert_eq!(scope.current().unwrap().codebase_id, "cb-2");
    }

    #[test]
    fn test_reenter_same_codebase_invalidates_old_token() {
        let scope = SessionScope::new();
        let first = scope.enter("cb-1");
        let again = scope.enter("cb-1");

        assert_ne!(first, again);
        assert!(!scope.is_current(&first));
        assert!(scope.is_current(&again));
    }

    #[test]
    fn test_leave_clears_session() {
        let scope = SessionScope::new();
        let token = scope.enter("cb-1");
        assert_eq!(scope.leave(), Some(token.clone()));
        assert!(!scope.is_current(&token));
        assert!(scope.current().is_none());
    }

    #[test]
    fn test_in_flight_counts_nested_guards() {
        let counter = AtomicUsize::new(0);
        {
            let _outer = InFlight::enter(&counter);
            {
                let _inner = InFlight::enter(&counter);
                assert_eq!(counter.load(Ordering::SeqCst), 2);
            }
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
