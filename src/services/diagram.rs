//! 图表渲染
//!
//! 把答案中的 Mermaid 描述文本交给外部渲染后端。渲染只是装饰：失败只记日志，
//! 状态进入 `Suppressed`，从不打断答案其余部分的显示。
//!
//! 状态机：`Idle → Rendering → {Rendered | Suppressed}`，新的输入文本从 `Idle` 重新开始。

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

// 首个有效行的图表类型声明
static RE_DIAGRAM_KIND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(graph|flowchart|sequenceDiagram|classDiagram|stateDiagram(?:-v2)?|erDiagram|gantt|pie|journey|gitGraph|mindmap|timeline)\b").unwrap()
});

/// 单次渲染的唯一句柄
///
/// 计数器保证同一渲染器内不重复，随机部分避免跨渲染器冲突。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramHandle(String);

impl DiagramHandle {
    fn new(counter: u64) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("diagram-{}-{}", counter, &random[..9]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 渲染产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramArtifact {
    pub handle: DiagramHandle,
    /// 图表类型，如 `flowchart`
    pub kind: String,
    /// 可显示的内容
    pub body: String,
}

/// 渲染失败
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderFailure {
    #[error("不支持的图表类型: {0}")]
    UnsupportedKind(String),
    #[error("图表内容为空")]
    Empty,
    #[error("渲染后端错误: {0}")]
    Backend(String),
}

/// 外部渲染后端
#[async_trait]
pub trait DiagramBackend: Send + Sync {
    async fn convert(
        &self,
        handle: &DiagramHandle,
        source: &str,
    ) -> Result<DiagramArtifact, RenderFailure>;
}

/// 渲染状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramState {
    Idle,
    Rendering { handle: DiagramHandle },
    Rendered(DiagramArtifact),
    Suppressed { handle: DiagramHandle },
}

impl DiagramState {
    /// 可显示的产物
    pub fn artifact(&self) -> Option<&DiagramArtifact> {
        match self {
            DiagramState::Rendered(artifact) => Some(artifact),
            _ => None,
        }
    }
}

struct Slot {
    source: Option<String>,
    state: DiagramState,
}

/// 图表渲染器
pub struct DiagramRenderer {
    backend: Arc<dyn DiagramBackend>,
    slot: Mutex<Slot>,
    counter: AtomicU64,
}

impl DiagramRenderer {
    pub fn new(backend: Arc<dyn DiagramBackend>) -> Self {
        Self {
            backend,
            slot: Mutex::new(Slot {
                source: None,
                state: DiagramState::Idle,
            }),
            counter: AtomicU64::new(0),
        }
    }

    fn next_handle(&self) -> DiagramHandle {
        DiagramHandle::new(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// 渲染描述文本
    ///
    /// 文本缺失时回到 `Idle` 且不调用后端；与当前输入相同时直接返回现有状态。
    pub async fn render(&self, source: Option<&str>) -> DiagramState {
        let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) else {
            let mut slot = self.slot.lock();
            slot.source = None;
            slot.state = DiagramState::Idle;
            return DiagramState::Idle;
        };

        let handle = {
            let mut slot = self.slot.lock();
            if slot.source.as_deref() == Some(source) && slot.state != DiagramState::Idle {
                return slot.state.clone();
            }
            let handle = self.next_handle();
            slot.source = Some(source.to_string());
            slot.state = DiagramState::Rendering {
                handle: handle.clone(),
            };
            handle
        };

        debug!("Rendering diagram {}", handle);
        let result = self.backend.convert(&handle, source).await;

        let mut slot = self.slot.lock();
        // 渲染期间输入已变化，本次结果作废
        if !matches!(&slot.state, DiagramState::Rendering { handle: h } if *h == handle) {
            return slot.state.clone();
        }

        slot.state = match result {
            Ok(artifact) => DiagramState::Rendered(artifact),
            Err(e) => {
                warn!("Diagram {} render failed: {}", handle, e);
                DiagramState::Suppressed { handle }
            }
        };
        slot.state.clone()
    }

    pub fn state(&self) -> DiagramState {
        self.slot.lock().state.clone()
    }

    /// 回到初始状态
    pub fn reset(&self) {
        let mut slot = self.slot.lock();
        slot.source = None;
        slot.state = DiagramState::Idle;
    }
}

/// 内置的文本后端
///
/// 识别图表类型并原样输出描述文本，供终端显示。
pub struct MermaidTextBackend;

#[async_trait]
impl DiagramBackend for MermaidTextBackend {
    async fn convert(
        &self,
        handle: &DiagramHandle,
        source: &str,
    ) -> Result<DiagramArtifact, RenderFailure> {
        let header = source
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with("%%"))
            .ok_or(RenderFailure::Empty)?;

        let kind = RE_DIAGRAM_KIND
            .captures(header)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                RenderFailure::UnsupportedKind(header.split_whitespace().next().unwrap_or(header).to_string())
            })?;

        Ok(DiagramArtifact {
            handle: handle.clone(),
            kind: kind.to_string(),
            body: source.trim_end().to_string(),
        })
    }
}
