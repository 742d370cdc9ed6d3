//! # Quiz Client
//!
//! 测验后端的 Rust 客户端：登录、出卷、限时答题、查看统计
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据模型（Models）
//! - `models/` - 后端 REST 接口的请求与响应结构
//!
//! ### ② 后端访问（Clients）
//! - `QuizApiClient` - 所有后端接口的 HTTP 封装
//! - `QuizBackend` - 答题流程依赖的后端能力（拉题、交卷、统计）
//! - `AuthoringBackend` - 出卷依赖的后端能力（建卷、改题、删卷、PDF 出题）
//!
//! ### ③ 业务能力层（Services）
//! - `AuthSession` - 登录状态，显式传递，不做全局单例
//! - `NotificationCenter` - 临时通知
//! - `QuizAuthoring` - 手动出卷、改题、删卷与 PDF 出题
//!
//! ### ④ 流程层（Workflow）
//! - `AnswerStore` - 作答记录
//! - `Countdown` - 答题倒计时
//! - `AttemptController` - 单次答题：作答、翻题、判分、只交一次卷
//! - `AttemptSession` - 指令与 tick 的串行事件循环
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/quiz_runner` - 终端客户端
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AuthoringBackend, QuizApiClient, QuizBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Answer, Question, QuizStatistics, UserIdentity};
pub use orchestrator::App;
pub use services::{AuthSession, NotificationCenter, NotificationKind};
pub use workflow::{
    AttemptCommand, AttemptController, AttemptCtx, AttemptReport, AttemptSession, ScoreSummary,
};
