//! RepoMind Q&A client
//!
//! 代码库问答前端的会话层：提问、历史、图表与重构建议都通过远端代码智能服务完成，
//! 本 crate 只维护会话状态并决定向用户展示什么。

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod state;
