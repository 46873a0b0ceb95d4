//! 问答会话控制器
//!
//! 负责一次提问的完整生命周期：校验草稿、调用网关、替换当前答案、
//! 触发历史刷新并发出通知。历史、图表与重构建议各自持有状态，
//! 控制器只通过它们的方法协作。

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::diagram::{DiagramBackend, DiagramRenderer, DiagramState};
use super::draft::QuestionDraft;
use super::history::{HistoryCache, RefreshOutcome};
use super::notify::{Notification, NotificationSink};
use super::refactor::{RefactorController, RefactorOutcome};
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;
use crate::models::{Answer, AskRequest, HistoryRecord};
use crate::state::{SessionScope, SessionToken};

/// 提问结果
#[derive(Debug)]
pub enum SubmitOutcome {
    /// 问题为空，未发起请求
    Invalid,
    /// 没有打开的代码库
    NoSession,
    /// 已有提问在进行中
    Busy,
    /// 答案已显示；附带后台历史刷新任务
    Answered {
        history_refresh: JoinHandle<RefreshOutcome>,
    },
    /// 网关失败，草稿保留
    Failed,
    /// 会话已切换，结果被丢弃
    Stale,
}

/// 提问期间持有的加载标记，离开作用域时复位
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 问答会话控制器
pub struct SessionController {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn NotificationSink>,
    scope: Arc<SessionScope>,
    history: Arc<HistoryCache>,
    refactor: RefactorController,
    diagram: DiagramRenderer,
    draft: Mutex<QuestionDraft>,
    active: RwLock<Option<Answer>>,
    loading: AtomicBool,
}

impl SessionController {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn NotificationSink>,
        diagram_backend: Arc<dyn DiagramBackend>,
        default_language: impl Into<String>,
    ) -> Self {
        let scope = Arc::new(SessionScope::new());
        let history = Arc::new(HistoryCache::new(
            gateway.clone(),
            scope.clone(),
            notifier.clone(),
        ));
        let refactor = RefactorController::new(gateway.clone(), notifier.clone(), default_language);

        Self {
            gateway,
            notifier,
            scope,
            history,
            refactor,
            diagram: DiagramRenderer::new(diagram_backend),
            draft: Mutex::new(QuestionDraft::default()),
            active: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    /// 打开代码库会话并加载历史
    pub async fn open(&self, codebase_id: &str) -> RefreshOutcome {
        let token = self.scope.enter(codebase_id);
        self.reset();
        info!("Codebase session opened: {} (epoch {})", token.codebase_id, token.epoch);
        self.history.refresh(&token).await
    }

    /// 关闭当前会话，之后到达的结果都会被丢弃
    pub fn close(&self) {
        if let Some(token) = self.scope.leave() {
            info!("Codebase session closed: {}", token.codebase_id);
        }
        self.reset();
    }

    fn reset(&self) {
        *self.active.write() = None;
        self.draft.lock().clear();
        self.refactor.clear();
        self.diagram.reset();
        self.history.clear();
    }

    pub fn codebase_id(&self) -> Option<String> {
        self.scope.current().map(|token| token.codebase_id)
    }

    pub fn set_question(&self, question: impl Into<String>) {
        self.draft.lock().question = question.into();
    }

    pub fn set_tags(&self, tags: impl Into<String>) {
        self.draft.lock().tags = tags.into();
    }

    pub fn draft(&self) -> QuestionDraft {
        self.draft.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn validate(&self, draft: &QuestionDraft) -> AppResult<SessionToken> {
        if draft.is_blank() {
            return Err(AppError::Validation("Enter a question".to_string()));
        }
        self.scope.current().ok_or(AppError::NoSession)
    }

    /// 提交当前草稿
    pub async fn submit(&self) -> SubmitOutcome {
        let draft = self.draft();
        let token = match self.validate(&draft) {
            Ok(token) => token,
            Err(e) => {
                self.notifier.notify(Notification::error(e.user_message("Invalid question")));
                return match e {
                    AppError::NoSession => SubmitOutcome::NoSession,
                    _ => SubmitOutcome::Invalid,
                };
            }
        };

        let Some(_loading) = LoadingGuard::acquire(&self.loading) else {
            debug!("Submit rejected: a question is already in flight");
            return SubmitOutcome::Busy;
        };

        let tags = draft.tag_list();
        let request = AskRequest {
            codebase_id: token.codebase_id.clone(),
            question: draft.question.clone(),
            tags: tags.clone(),
        };
        info!("Asking question: codebase={}, tags={:?}", token.codebase_id, tags);

        let result = self.gateway.ask(&request).await;

        if !self.scope.is_current(&token) {
            debug!("Discarding answer for stale session {}", token.codebase_id);
            return SubmitOutcome::Stale;
        }

        match result {
            Ok(response) => {
                let answer = Answer {
                    question: draft.question,
                    answer: response.answer,
                    diagram: response.mermaid_code,
                    file_references: response.file_references,
                    tags,
                };
                *self.active.write() = Some(answer);
                self.draft.lock().clear();
                // 建议只属于产生它的答案
                self.refactor.clear();

                let history = self.history.clone();
                let history_refresh = tokio::spawn(async move { history.refresh(&token).await });

                self.notifier.notify(Notification::success("Answer ready!"));
                SubmitOutcome::Answered { history_refresh }
            }
            Err(e) => {
                let error = AppError::from(e);
                warn!("Ask failed: {}", error);
                self.notifier
                    .notify(Notification::error(error.user_message("Failed to get answer")));
                SubmitOutcome::Failed
            }
        }
    }

    /// 显示一条历史记录，不发起网络请求
    pub fn select_from_history(&self, record: &HistoryRecord) {
        *self.active.write() = Some(record.to_answer());
    }

    pub fn active_answer(&self) -> Option<Answer> {
        self.active.read().clone()
    }

    /// 根据当前答案更新图表
    pub async fn render_diagram(&self) -> DiagramState {
        let source = self
            .active
            .read()
            .as_ref()
            .and_then(|answer| answer.diagram_text().map(str::to_string));
        self.diagram.render(source.as_deref()).await
    }

    /// 为当前答案的第 `index` 个文件引用请求重构建议
    pub async fn refactor_reference(&self, index: usize) -> Option<RefactorOutcome> {
        let reference = self
            .active
            .read()
            .as_ref()
            .and_then(|answer| answer.file_references.get(index).cloned())?;
        Some(self.refactor.request_for_reference(&reference).await)
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn refactor(&self) -> &RefactorController {
        &self.refactor
    }
}
