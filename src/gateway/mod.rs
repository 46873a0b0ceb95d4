//! 网关模块
//!
//! 代码智能服务的客户端边界：提问、历史、代码库列表、重构建议与健康检查。

mod client;
mod format;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use client::HttpGateway;
pub use format::{build_endpoint, fix_base_url};
pub use types::*;
