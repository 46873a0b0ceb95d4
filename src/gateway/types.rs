//! 网关类型定义

use async_trait::async_trait;

use crate::models::{AskRequest, AskResponse, CodebaseSummary, HealthSnapshot, HistoryRecord, RefactorSuggestion};

/// 网关错误类型
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP 请求错误
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// 服务端返回错误
    #[error("API 错误 ({status}): {}", .message.as_deref().unwrap_or("无详细信息"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// JSON 解析错误
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

impl GatewayError {
    /// 服务端报告的可读消息
    pub fn user_message(&self) -> Option<&str> {
        match self {
            GatewayError::Api { message, .. } => message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// 代码智能服务
///
/// 每个调用都是一次挂起点；实现不做重试。
#[async_trait]
pub trait Gateway: Send + Sync {
    /// 针对代码库提问
    async fn ask(&self, request: &AskRequest) -> GatewayResult<AskResponse>;

    /// 获取代码库的历史问答（服务端决定顺序）
    async fn fetch_history(&self, codebase_id: &str) -> GatewayResult<Vec<HistoryRecord>>;

    /// 获取全部代码库
    async fn fetch_all_codebases(&self) -> GatewayResult<Vec<CodebaseSummary>>;

    /// 为代码片段生成重构建议
    async fn refactor(&self, code: &str, language: &str) -> GatewayResult<Vec<RefactorSuggestion>>;

    /// 健康检查
    async fn health(&self) -> GatewayResult<HealthSnapshot>;
}
