//! 答题事件循环
//!
//! 用户指令与每秒 tick 在同一个任务里串行处理（`tokio::select!`），
//! 不存在两个回调交错执行的情况，交卷锁因此无需额外加锁。

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{info, warn};

use crate::error::AppResult;
use crate::workflow::attempt_controller::{AttemptController, ScoreSummary};

/// 用户指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptCommand {
    /// 按选项 ID 作答
    Select(i64),
    /// 按选项序号作答（从 1 开始）
    SelectOption(usize),
    /// 下一题
    Advance,
    /// 手动交卷
    Submit,
    /// 放弃本次答题（不提交）
    Quit,
}

/// 推给界面的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// 开始答题
    Started,
    /// 处理完一条指令
    Command(AttemptCommand),
    /// 指令无效（如选项序号越界、已交卷）
    Rejected(AttemptCommand),
    /// 倒计时走了一秒
    Tick(u64),
    /// 已交卷
    Finished,
}

/// 答题结束报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptReport {
    /// 提交成功时的判分结果
    pub summary: Option<ScoreSummary>,
    /// 提交失败信息（答题仍视为已结束）
    pub submit_error: Option<String>,
    /// 是否完成交卷（中途退出为 false）
    pub finalized: bool,
}

pub struct AttemptSession {
    controller: AttemptController,
    tick_period: Duration,
}

impl AttemptSession {
    pub fn new(controller: AttemptController) -> Self {
        Self::with_tick_period(controller, Duration::from_secs(1))
    }

    pub fn with_tick_period(controller: AttemptController, tick_period: Duration) -> Self {
        Self {
            controller,
            tick_period,
        }
    }

    /// 运行直到交卷、收到 Quit 或指令通道关闭
    ///
    /// `observe` 在每个事件之后被调用，用于渲染
    pub async fn run<F>(
        mut self,
        mut commands: mpsc::Receiver<AttemptCommand>,
        mut observe: F,
    ) -> AttemptReport
    where
        F: FnMut(&AttemptController, SessionEvent),
    {
        let mut report = AttemptReport::default();
        let mut ticker = interval_at(Instant::now() + self.tick_period, self.tick_period);

        observe(&self.controller, SessionEvent::Started);

        while !self.controller.is_finalized() {
            tokio::select! {
                command = commands.recv() => {
                    let command = match command {
                        Some(AttemptCommand::Quit) | None => {
                            self.controller.cancel();
                            info!("[测验 {}] 已放弃本次答题", self.controller.quiz_id());
                            break;
                        }
                        Some(command) => command,
                    };

                    let event = if self.apply(command, &mut report).await {
                        SessionEvent::Command(command)
                    } else {
                        SessionEvent::Rejected(command)
                    };
                    observe(&self.controller, event);
                }
                _ = ticker.tick() => {
                    let result = self.controller.on_tick().await;
                    Self::record(result, &mut report);
                    observe(&self.controller, SessionEvent::Tick(self.controller.remaining_secs()));
                }
            }
        }

        report.finalized = self.controller.is_finalized();
        if report.finalized {
            observe(&self.controller, SessionEvent::Finished);
        }
        report
    }

    /// 处理一条指令，返回指令是否生效
    async fn apply(&mut self, command: AttemptCommand, report: &mut AttemptReport) -> bool {
        match command {
            AttemptCommand::Select(answer_id) => self.controller.select(answer_id).is_ok(),
            AttemptCommand::SelectOption(option) => match self.controller.select_option(option) {
                Ok(selected) => selected,
                Err(e) => {
                    warn!("{}", e);
                    false
                }
            },
            AttemptCommand::Advance => self.controller.advance(),
            AttemptCommand::Submit => {
                let result = self.controller.finalize().await;
                Self::record(result, report)
            }
            AttemptCommand::Quit => false,
        }
    }

    /// 记录交卷结果，返回本次是否真的交了卷
    fn record(result: AppResult<Option<ScoreSummary>>, report: &mut AttemptReport) -> bool {
        match result {
            Ok(Some(summary)) => {
                report.summary = Some(summary);
                true
            }
            Ok(None) => false,
            Err(e) => {
                report.submit_error = Some(e.to_string());
                true
            }
        }
    }
}
