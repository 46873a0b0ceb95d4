//! 用户通知
//!
//! 控制器只决定通知什么，不关心如何展示。

use tokio::sync::mpsc;
use tracing::warn;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// 一条用户可见的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// 通知接收端
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// 通过通道转发给展示层
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // 接收端已关闭说明展示层已退出，丢弃即可
        if self.tx.send(notification).is_err() {
            warn!("Notification dropped: receiver closed");
        }
    }
}

/// 记录所有通知，供测试断言
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingSink {
    seen: parking_lot::Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter(|n| n.severity == Severity::Error)
            .map(|n| n.message.clone())
            .collect()
    }
}

#[cfg(test)]
impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
