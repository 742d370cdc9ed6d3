//! 答题倒计时
//!
//! 状态：Idle → Running → Expired（终态），任意非终态 → Cancelled（终态）。
//! 每次 tick 减 1 秒、最低到 0；到 0 时只报告一次 Expired，之后不再计时。

use std::fmt;

/// 倒计时状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running,
    Expired,
    Cancelled,
}

/// 一次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// 不在运行中，tick 被忽略
    Ignored,
    /// 仍在计时，附带剩余秒数
    Running(u64),
    /// 本次 tick 到期
    Expired,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u64,
    state: CountdownState,
}

impl Countdown {
    pub fn new(seconds: u64) -> Self {
        Self {
            remaining: seconds,
            state: CountdownState::Idle,
        }
    }

    /// Idle → Running，其它状态下无效
    pub fn start(&mut self) {
        if self.state == CountdownState::Idle {
            self.state = CountdownState::Running;
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.state != CountdownState::Running {
            return Tick::Ignored;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    /// 停止计时，之后不会再报告到期；终态下调用无效果
    pub fn cancel(&mut self) {
        if matches!(self.state, CountdownState::Idle | CountdownState::Running) {
            self.state = CountdownState::Cancelled;
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_mm_ss(self.remaining))
    }
}

/// 秒数格式化为 MM:SS（超过 99 分钟时分钟位照常增长）
pub fn format_mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_countdown_expires_once() {
        let mut countdown = Countdown::new(300);
        countdown.start();

        let mut expired = 0;
        for _ in 0..300 {
            if countdown.tick() == Tick::Expired {
                expired += 1;
            }
        }

        assert_eq!(countdown.remaining(), 0);
        assert_eq!(expired, 1);
        assert_eq!(countdown.state(), CountdownState::Expired);

        // 到期后继续 tick 不再有任何效果
        assert_eq!(countdown.tick(), Tick::Ignored);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_cancel_suppresses_expiry() {
        let mut countdown = Countdown::new(3);
        countdown.start();
        assert_eq!(countdown.tick(), Tick::Running(2));

        countdown.cancel();
        for _ in 0..5 {
            assert_eq!(countdown.tick(), Tick::Ignored);
        }
        assert_eq!(countdown.remaining(), 2);
        assert_eq!(countdown.state(), CountdownState::Cancelled);
    }

    #[test]
    fn test_idle_ignores_ticks() {
        let mut countdown = Countdown::new(5);
        assert_eq!(countdown.tick(), Tick::Ignored);
        assert_eq!(countdown.remaining(), 5);
    }

    #[test]
    fn test_cancel_after_expiry_keeps_expired() {
        let mut countdown = Countdown::new(1);
        countdown.start();
        assert_eq!(countdown.tick(), Tick::Expired);
        countdown.cancel();
        assert_eq!(countdown.state(), CountdownState::Expired);
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(300), "05:00");
        assert_eq!(format_mm_ss(61), "01:01");
        assert_eq!(format_mm_ss(9), "00:09");
        assert_eq!(format_mm_ss(0), "00:00");
    }
}
