//! 测试用网关
//!
//! 每个操作维护一个应答队列；`gate` 返回的发送端让测试决定应答时机，
//! 用来构造乱序完成的场景。

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

use super::types::{Gateway, GatewayError, GatewayResult};
use crate::models::{
    AskRequest, AskResponse, CodebaseSummary, FileReference, HealthSnapshot, HistoryRecord,
    Priority, RefactorSuggestion, SourceKind,
};

enum Reply<T> {
    Ready(GatewayResult<T>),
    Gated(oneshot::Receiver<GatewayResult<T>>),
}

/// 单个操作的应答脚本
pub(crate) struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicUsize,
}

impl<T> Script<T> {
    fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_ok(&self, value: T) {
        self.replies.lock().push_back(Reply::Ready(Ok(value)));
    }

    pub fn push_err(&self, error: GatewayError) {
        self.replies.lock().push_back(Reply::Ready(Err(error)));
    }

    /// 排入一个延迟应答
    pub fn gate(&self) -> oneshot::Sender<GatewayResult<T>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().push_back(Reply::Gated(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> GatewayResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx.await.unwrap_or_else(|_| Err(api_error(503, None))),
            None => Err(api_error(500, Some("no scripted reply"))),
        }
    }
}

/// 脚本化网关
pub(crate) struct MockGateway {
    pub ask: Script<AskResponse>,
    pub history: Script<Vec<HistoryRecord>>,
    pub codebases: Script<Vec<CodebaseSummary>>,
    pub refactor: Script<Vec<RefactorSuggestion>>,
    pub health: Script<HealthSnapshot>,
    pub ask_requests: Mutex<Vec<AskRequest>>,
    pub history_requests: Mutex<Vec<String>>,
    pub refactor_requests: Mutex<Vec<(String, String)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            ask: Script::new(),
            history: Script::new(),
            codebases: Script::new(),
            refactor: Script::new(),
            health: Script::new(),
            ask_requests: Mutex::new(Vec::new()),
            history_requests: Mutex::new(Vec::new()),
            refactor_requests: Mutex::new(Vec::new()),
        }
    }

    /// 全部操作的调用总数
    pub fn total_calls(&self) -> usize {
        self.ask.calls()
            + self.history.calls()
            + self.codebases.calls()
            + self.refactor.calls()
            + self.health.calls()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn ask(&self, request: &AskRequest) -> GatewayResult<AskResponse> {
        self.ask_requests.lock().push(request.clone());
        self.ask.next().await
    }

    async fn fetch_history(&self, codebase_id: &str) -> GatewayResult<Vec<HistoryRecord>> {
        self.history_requests.lock().push(codebase_id.to_string());
        self.history.next().await
    }

    async fn fetch_all_codebases(&self) -> GatewayResult<Vec<CodebaseSummary>> {
        self.codebases.next().await
    }

    async fn refactor(&self, code: &str, language: &str) -> GatewayResult<Vec<RefactorSuggestion>> {
        self.refactor_requests
            .lock()
            .push((code.to_string(), language.to_string()));
        self.refactor.next().await
    }

    async fn health(&self) -> GatewayResult<HealthSnapshot> {
        self.health.next().await
    }
}

pub(crate) fn api_error(status: u16, message: Option<&str>) -> GatewayError {
    GatewayError::Api {
        status,
        message: message.map(str::to_string),
    }
}

pub(crate) fn file_reference(file: &str, line_start: u32, line_end: u32) -> FileReference {
    FileReference {
        file: file.to_string(),
        line_start,
        line_end,
        snippet: format!("// {} snippet", file),
        explanation: None,
    }
}

pub(crate) fn ask_response(answer: &str, diagram: Option<&str>, refs: Vec<FileReference>) -> AskResponse {
    AskResponse {
        answer: answer.to_string(),
        mermaid_code: diagram.map(str::to_string),
        file_references: refs,
    }
}

pub(crate) fn history_record(question: &str) -> HistoryRecord {
    HistoryRecord {
        question: question.to_string(),
        answer: format!("answer to {}", question),
        mermaid_code: None,
        file_references: Vec::new(),
        tags: Vec::new(),
        created_at: None,
    }
}

pub(crate) fn suggestion(title: &str, priority: Priority) -> RefactorSuggestion {
    RefactorSuggestion {
        title: title.to_string(),
        description: format!("{} description", title),
        priority,
        category: "structure".to_string(),
    }
}

pub(crate) fn codebase(id: &str, name: &str) -> CodebaseSummary {
    CodebaseSummary {
        id: id.to_string(),
        name: name.to_string(),
        source: SourceKind::Github,
        file_count: Some(10),
        created_at: None,
    }
}
