//! 网关 REST 请求/响应模型

use serde::{Deserialize, Serialize};

use super::answer::{CodebaseSummary, FileReference, RefactorSuggestion};

/// 提问请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub codebase_id: String,
    pub question: String,
    pub tags: Vec<String>,
}

/// 提问响应
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub mermaid_code: Option<String>,
    #[serde(default)]
    pub file_references: Vec<FileReference>,
}

/// 历史响应
///
/// `questions` 保留原始 JSON，缺失或不是数组时按空列表处理。
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub questions: serde_json::Value,
}

/// 全部代码库响应
#[derive(Debug, Deserialize)]
pub struct CodebasesResponse {
    #[serde(default)]
    pub codebases: Option<Vec<CodebaseSummary>>,
}

/// 重构请求
#[derive(Debug, Clone, Serialize)]
pub struct RefactorRequest {
    pub code: String,
    pub language: String,
}

/// 重构响应
#[derive(Debug, Deserialize)]
pub struct RefactorResponse {
    #[serde(default)]
    pub suggestions: Option<Vec<RefactorSuggestion>>,
}

/// 网关错误响应体
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
