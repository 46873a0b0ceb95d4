//! 数据模型模块

mod answer;
mod api;
mod health;

pub use answer::*;
pub use api::*;
pub use health::*;
