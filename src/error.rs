//! 统一错误处理模块
//!
//! 定义应用级错误类型。网关错误在 `gateway` 模块中定义，这里只做汇总。

use thiserror::Error;

use crate::gateway::GatewayError;

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 本地校验失败（不会发起网络请求）
    #[error("校验错误: {0}")]
    Validation(String),

    /// 网关调用错误
    #[error("网关错误: {0}")]
    Gateway(#[from] GatewayError),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 当前没有打开的代码库会话
    #[error("没有活动的代码库会话")]
    NoSession,
}

impl AppError {
    /// 面向用户的简短提示
    ///
    /// 网关错误优先使用服务端返回的消息，否则使用 `fallback`。
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Gateway(e) => e.user_message().unwrap_or(fallback).to_string(),
            AppError::Config(_) => fallback.to_string(),
            AppError::NoSession => "Open a codebase first".to_string(),
        }
    }
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
