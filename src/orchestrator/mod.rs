//! 编排层
//!
//! - `quiz_runner` - 终端客户端入口，持有后端客户端、登录状态和通知中心

pub mod quiz_runner;

pub use quiz_runner::{parse_command, App};
