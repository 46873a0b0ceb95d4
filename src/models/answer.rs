//! 问答领域类型
//!
//! 答案、文件引用、历史记录、重构建议与代码库摘要。字段别名同时兼容
//! 问答接口（camelCase）与历史接口（snake_case）两种返回格式。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 答案中引用的代码片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    /// 文件路径
    pub file: String,
    /// 起始行（含），缺失时为 0
    #[serde(default, alias = "line_start")]
    pub line_start: u32,
    /// 结束行（含）
    #[serde(default, alias = "line_end")]
    pub line_end: u32,
    /// 代码片段
    #[serde(default)]
    pub snippet: String,
    /// 片段说明
    #[serde(default)]
    pub explanation: Option<String>,
}

impl FileReference {
    /// 行号范围标签，如 `L10–40`
    pub fn line_label(&self) -> String {
        format!("L{}–{}", self.line_start, self.line_end)
    }

    pub fn has_snippet(&self) -> bool {
        !self.snippet.trim().is_empty()
    }
}

/// 当前显示的问答
///
/// 整体替换，从不合并。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    /// 图表描述文本（Mermaid）
    pub diagram: Option<String>,
    pub file_references: Vec<FileReference>,
    /// 按用户输入顺序保存，不去重
    pub tags: Vec<String>,
}

impl Answer {
    /// 非空的图表描述文本
    pub fn diagram_text(&self) -> Option<&str> {
        self.diagram
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// 服务端保存的历史问答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, alias = "mermaidCode")]
    pub mermaid_code: Option<String>,
    #[serde(default, alias = "fileReferences")]
    pub file_references: Vec<FileReference>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl HistoryRecord {
    /// 转换为可显示的答案
    pub fn to_answer(&self) -> Answer {
        Answer {
            question: self.question.clone(),
            answer: self.answer.clone(),
            diagram: self.mermaid_code.clone(),
            file_references: self.file_references.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// 重构建议优先级
///
/// 无法识别的取值按 `Low` 处理。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Medium,
    High,
    #[default]
    #[serde(other)]
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// 单条重构建议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
}

/// 代码库来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Github,
    Zip,
    #[default]
    #[serde(other)]
    Unknown,
}

/// 代码库摘要（全部代码库列表中的一项）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebaseSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default, alias = "fileCount")]
    pub file_count: Option<u64>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}
