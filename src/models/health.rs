//! 健康检查快照

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 子系统状态（数据库、AI 服务）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemStatus {
    #[serde(default)]
    pub status: String,
}

/// 运行环境信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(default)]
    pub node_version: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub memory_usage: Option<String>,
    #[serde(default)]
    pub uptime: Option<String>,
}

/// 服务端统计
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStats {
    #[serde(default)]
    pub codebases: Option<u64>,
    #[serde(default)]
    pub code_files: Option<u64>,
    #[serde(default)]
    pub questions: Option<u64>,
}

/// 一次健康检查的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: String,
    #[serde(default)]
    pub database: Option<SubsystemStatus>,
    #[serde(default)]
    pub ai: Option<SubsystemStatus>,
    #[serde(default)]
    pub system: Option<SystemInfo>,
    #[serde(default)]
    pub stats: Option<HealthStats>,
    #[serde(default)]
    pub error: Option<String>,
    /// 检查时间（本地填写）
    #[serde(skip)]
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthSnapshot {
    /// 网关不可达时的降级快照
    pub fn unreachable() -> Self {
        Self {
            status: "error".to_string(),
            database: None,
            ai: None,
            system: None,
            stats: None,
            error: Some("Cannot reach backend".to_string()),
            checked_at: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    pub fn database_connected(&self) -> bool {
        self.database
            .as_ref()
            .is_some_and(|db| db.status == "connected")
    }

    pub fn ai_configured(&self) -> bool {
        self.ai.as_ref().is_some_and(|ai| ai.status == "configured")
    }
}
