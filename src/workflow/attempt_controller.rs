//! 单次答题流程 - 流程层
//!
//! 核心职责：管理"一次答题"从加载到交卷的全过程
//!
//! 1. start：拉题 → 初始化作答记录 → 启动倒计时
//! 2. select / advance：作答与向后翻题
//! 3. finalize：判分 → 提交成绩，整个答题期间只执行一次
//!
//! 交卷分两步：`begin_finalize` 同步地占用交卷锁、停止倒计时并判分，
//! 然后才 await 网络提交；提交期间到来的 tick 只会碰到已取消的倒计时。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::clients::QuizBackend;
use crate::error::{AppError, AppResult, AttemptError};
use crate::models::{NewSubmission, Question};
use crate::services::NotificationKind;
use crate::workflow::answer_store::AnswerStore;
use crate::workflow::attempt_ctx::AttemptCtx;
use crate::workflow::countdown::{format_mm_ss, Countdown, CountdownState, Tick};

/// 交卷状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeState {
    /// 答题中
    Idle,
    /// 已判分，正在提交
    Finalizing,
    /// 已结束（无论提交是否成功）
    Finalized,
}

/// 判分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub correct: u32,
    pub wrong: u32,
    pub total: u32,
}

/// 已判分、待提交的成绩
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub submission: NewSubmission,
    pub summary: ScoreSummary,
}

/// 给界面展示用的快照
#[derive(Debug, Clone)]
pub struct AttemptView<'a> {
    pub question: &'a Question,
    /// 从 1 开始
    pub position: usize,
    pub total: usize,
    /// MM:SS
    pub remaining: String,
    pub selected_answer: Option<i64>,
    pub finalize_state: FinalizeState,
    pub result: Option<ScoreSummary>,
}

/// 判分：每题以第一个正确选项为准，与作答一致记对，其余（含未作答、无正确选项）记错
pub fn score(questions: &[Question], answers: &AnswerStore) -> ScoreSummary {
    let correct = questions
        .iter()
        .filter(|q| match (q.correct_answer_id(), answers.get(q.question_id)) {
            (Some(expected), Some(chosen)) => expected == chosen,
            _ => false,
        })
        .count() as u32;
    let total = questions.len() as u32;

    ScoreSummary {
        correct,
        wrong: total - correct,
        total,
    }
}

/// 答题控制器
///
/// - 独占本次答题的全部状态
/// - 持有作答记录与倒计时
/// - 只依赖后端能力（QuizBackend），不关心 HTTP 细节
pub struct AttemptController {
    ctx: AttemptCtx,
    backend: Arc<dyn QuizBackend>,
    quiz_id: i64,
    questions: Vec<Question>,
    current_index: usize,
    answers: AnswerStore,
    countdown: Countdown,
    finalize_state: FinalizeState,
    summary: Option<ScoreSummary>,
}

impl AttemptController {
    /// 拉取题目并开始答题
    ///
    /// 拉取失败或没有题目时返回题目加载错误
    pub async fn start(
        ctx: AttemptCtx,
        backend: Arc<dyn QuizBackend>,
        quiz_id: i64,
    ) -> AppResult<Self> {
        info!("{} [测验 {}] 📥 正在加载题目...", ctx, quiz_id);

        let questions = match backend.fetch_questions(quiz_id).await {
            Ok(questions) => questions,
            Err(e) => {
                error!("[测验 {}] ❌ 题目加载失败: {}", quiz_id, e);
                ctx.notifier.push(NotificationKind::Error, "暂无题目");
                return Err(AppError::load_failed(quiz_id, e.to_string()));
            }
        };

        Self::with_questions(ctx, backend, quiz_id, questions)
    }

    /// 用已有题目直接开始；题目为空时返回题目加载错误
    pub fn with_questions(
        ctx: AttemptCtx,
        backend: Arc<dyn QuizBackend>,
        quiz_id: i64,
        questions: Vec<Question>,
    ) -> AppResult<Self> {
        if questions.is_empty() {
            warn!("[测验 {}] ⚠️ 测验没有题目", quiz_id);
            ctx.notifier.push(NotificationKind::Warning, "暂无题目");
            return Err(AppError::load_failed(quiz_id, "暂无题目"));
        }

        let mut countdown = Countdown::new(ctx.duration_secs);
        countdown.start();

        info!(
            "[测验 {}] ✓ 共 {} 道题，限时 {}",
            quiz_id,
            questions.len(),
            format_mm_ss(ctx.duration_secs)
        );

        Ok(Self {
            ctx,
            backend,
            quiz_id,
            questions,
            current_index: 0,
            answers: AnswerStore::new(),
            countdown,
            finalize_state: FinalizeState::Idle,
            summary: None,
        })
    }

    // ========== 作答 ==========

    /// 为当前题目选择选项
    pub fn select(&mut self, answer_id: i64) -> AppResult<()> {
        self.ensure_open()?;
        let question_id = self.current_question().question_id;
        self.answers.select(question_id, answer_id);
        debug!("[测验 {}] 题目 {} 选择了 {}", self.quiz_id, question_id, answer_id);
        Ok(())
    }

    /// 按选项序号（从 1 开始）选择，序号越界时返回 false
    pub fn select_option(&mut self, option: usize) -> AppResult<bool> {
        self.ensure_open()?;
        let answer_id = option
            .checked_sub(1)
            .and_then(|i| self.current_question().answers.get(i))
            .map(|a| a.answer_id);

        match answer_id {
            Some(id) => self.select(id).map(|_| true),
            None => Ok(false),
        }
    }

    /// 翻到下一题；已是最后一题或已交卷时不动，返回是否翻页
    pub fn advance(&mut self) -> bool {
        if self.finalize_state != FinalizeState::Idle || self.is_last() {
            return false;
        }
        self.current_index += 1;
        true
    }

    // ========== 交卷 ==========

    /// 交卷第一步：占锁、停表、判分
    ///
    /// 只有第一次调用返回 Some，之后一律返回 None
    pub fn begin_finalize(&mut self) -> Option<PendingSubmission> {
        if self.finalize_state != FinalizeState::Idle {
            debug!("[测验 {}] 已在交卷流程中，忽略重复交卷", self.quiz_id);
            return None;
        }
        self.finalize_state = FinalizeState::Finalizing;
        self.countdown.cancel();

        let summary = score(&self.questions, &self.answers);
        let submission = NewSubmission {
            user_id: self.ctx.user.id,
            quiz_id: self.quiz_id,
            score: summary.correct,
            submitted_at: Utc::now(),
        };

        info!(
            "[测验 {}] 📝 判分完成: 正确 {} / 错误 {} / 共 {}",
            self.quiz_id, summary.correct, summary.wrong, summary.total
        );

        Some(PendingSubmission {
            submission,
            summary,
        })
    }

    /// 交卷第二步：记录提交结果；无论成败答题都视为结束，不重试
    pub fn complete_finalize(
        &mut self,
        pending: PendingSubmission,
        submit_result: AppResult<()>,
    ) -> AppResult<Option<ScoreSummary>> {
        self.finalize_state = FinalizeState::Finalized;

        match submit_result {
            Ok(()) => {
                info!("[测验 {}] ✓ 成绩已提交 (得分 {})", self.quiz_id, pending.submission.score);
                self.ctx.notifier.push(
                    NotificationKind::Success,
                    format!(
                        "交卷成功: {} / {}",
                        pending.summary.correct, pending.summary.total
                    ),
                );
                self.summary = Some(pending.summary);
                Ok(Some(pending.summary))
            }
            Err(e) => {
                error!("[测验 {}] ❌ 成绩提交失败: {}", self.quiz_id, e);
                self.ctx
                    .notifier
                    .push(NotificationKind::Error, "成绩提交失败");
                Err(AppError::submit_failed(self.quiz_id, e))
            }
        }
    }

    /// 交卷：重复调用为空操作，返回 Ok(None)
    pub async fn finalize(&mut self) -> AppResult<Option<ScoreSummary>> {
        let Some(pending) = self.begin_finalize() else {
            return Ok(None);
        };

        info!("[测验 {}] 📤 正在提交成绩...", self.quiz_id);
        let result = self.backend.submit_result(&pending.submission).await;
        self.complete_finalize(pending, result)
    }

    /// 每秒调用一次；倒计时到期时自动交卷
    pub async fn on_tick(&mut self) -> AppResult<Option<ScoreSummary>> {
        match self.countdown.tick() {
            Tick::Expired => {
                warn!("[测验 {}] ⏰ 时间到，自动交卷", self.quiz_id);
                self.finalize().await
            }
            Tick::Running(_) | Tick::Ignored => Ok(None),
        }
    }

    /// 离开答题（不交卷），停止倒计时
    pub fn cancel(&mut self) {
        if self.countdown.is_running() {
            info!("[测验 {}] 已退出答题，剩余 {}", self.quiz_id, self.countdown);
        }
        self.countdown.cancel();
    }

    // ========== 查询 ==========

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn selected_answer(&self, question_id: i64) -> Option<i64> {
        self.answers.get(question_id)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining()
    }

    pub fn countdown_state(&self) -> CountdownState {
        self.countdown.state()
    }

    pub fn finalize_state(&self) -> FinalizeState {
        self.finalize_state
    }

    pub fn is_finalized(&self) -> bool {
        self.finalize_state == FinalizeState::Finalized
    }

    /// 提交成功后的判分结果
    pub fn summary(&self) -> Option<ScoreSummary> {
        self.summary
    }

    pub fn view(&self) -> AttemptView<'_> {
        let question = self.current_question();
        AttemptView {
            question,
            position: self.current_index + 1,
            total: self.questions.len(),
            remaining: format_mm_ss(self.countdown.remaining()),
            selected_answer: self.answers.get(question.question_id),
            finalize_state: self.finalize_state,
            result: self.summary,
        }
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.finalize_state == FinalizeState::Idle {
            Ok(())
        } else {
            Err(AttemptError::Finalized {
                quiz_id: self.quiz_id,
            }
            .into())
        }
    }
}

impl Drop for AttemptController {
    fn drop(&mut self) {
        self.countdown.cancel();
    }
}
