//! 答题上下文
//!
//! 封装"谁在答题、通知发到哪里、限时多久"，由调用方显式传入

use std::fmt::Display;

use crate::config::Config;
use crate::models::UserIdentity;
use crate::services::NotificationCenter;

#[derive(Debug, Clone)]
pub struct AttemptCtx {
    /// 当前登录用户
    pub user: UserIdentity,

    /// 通知中心句柄
    pub notifier: NotificationCenter,

    /// 倒计时总时长（秒）
    pub duration_secs: u64,
}

impl AttemptCtx {
    pub fn new(user: UserIdentity, notifier: NotificationCenter, duration_secs: u64) -> Self {
        Self {
            user,
            notifier,
            duration_secs,
        }
    }

    /// 按配置中的时长创建
    pub fn from_config(config: &Config, user: UserIdentity, notifier: NotificationCenter) -> Self {
        Self::new(user, notifier, config.quiz_duration_secs)
    }
}

impl Display for AttemptCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[用户 ID#{} {}]", self.user.id, self.user.email)
    }
}
