pub mod answer_store;
pub mod attempt_controller;
pub mod attempt_ctx;
pub mod attempt_session;
pub mod countdown;

pub use answer_store::AnswerStore;
pub use attempt_controller::{
    score, AttemptController, AttemptView, FinalizeState, PendingSubmission, ScoreSummary,
};
pub use attempt_ctx::AttemptCtx;
pub use attempt_session::{AttemptCommand, AttemptReport, AttemptSession, SessionEvent};
pub use countdown::{format_mm_ss, Countdown, CountdownState, Tick};
