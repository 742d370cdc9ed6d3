//! 临时通知 - 业务能力层
//!
//! 每条通知有固定的存活时间，过期后由 `prune` 清掉。
//! 句柄可以 clone，多个组件共用同一个通知中心。

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// 单条通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    default_duration: Duration,
    items: Vec<Notification>,
}

/// 通知中心
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
}

impl NotificationCenter {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1,
                default_duration,
                items: Vec::new(),
            })),
        }
    }

    /// 以默认时长推送一条通知，返回通知 ID
    pub fn push(&self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        let duration = self.lock().default_duration;
        self.push_with_duration(kind, message, duration)
    }

    pub fn push_with_duration(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration: Duration,
    ) -> u64 {
        self.push_at(kind, message, duration, Instant::now())
    }

    fn push_at(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration: Duration,
        now: Instant,
    ) -> u64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let message = message.into();
        debug!("通知 #{} [{:?}]: {}", id, kind, message);

        inner.items.push(Notification {
            id,
            kind,
            message,
            expires_at: now + duration,
        });
        id
    }

    /// 当前仍在显示期内的通知（按推送顺序）
    pub fn active(&self, now: Instant) -> Vec<Notification> {
        self.lock()
            .items
            .iter()
            .filter(|n| n.expires_at > now)
            .cloned()
            .collect()
    }

    /// ID 大于 `after_id` 且仍在显示期内的通知，用于只展示新到的通知
    pub fn active_after(&self, after_id: u64, now: Instant) -> Vec<Notification> {
        self.lock()
            .items
            .iter()
            .filter(|n| n.id > after_id && n.expires_at > now)
            .cloned()
            .collect()
    }

    /// 删除已过期的通知，返回删除条数
    pub fn prune(&self, now: Instant) -> usize {
        let mut inner = self.lock();
        let before = inner.items.len();
        inner.items.retain(|n| n.expires_at > now);
        before - inner.items.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // 持锁期间不会 panic，中毒后数据依旧可用
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}
