//! 健康检查轮询
//!
//! 固定间隔检查网关状态，通过 watch 通道发布快照。监视器被丢弃时定时任务随之取消。

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::gateway::Gateway;
use crate::models::HealthSnapshot;

/// 执行一次健康检查，任何失败都视为降级
pub async fn check_health(gateway: &dyn Gateway) -> HealthSnapshot {
    let mut snapshot = match gateway.health().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Health check failed: {}", e);
            HealthSnapshot::unreachable()
        }
    };
    snapshot.checked_at = Some(Utc::now());
    snapshot
}

/// 健康检查监视器
pub struct HealthMonitor {
    rx: watch::Receiver<Option<HealthSnapshot>>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// 启动轮询：立即检查一次，之后每隔 `interval` 检查
    pub fn spawn(gateway: Arc<dyn Gateway>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticks = IntervalStream::new(tokio::time::interval(interval));
            while ticks.next().await.is_some() {
                let snapshot = check_health(gateway.as_ref()).await;
                debug!("Health status: {}", snapshot.status);
                if tx.send(Some(snapshot)).is_err() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// 最近一次快照
    pub fn latest(&self) -> Option<HealthSnapshot> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<HealthSnapshot>> {
        self.rx.clone()
    }

    /// 停止轮询
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
