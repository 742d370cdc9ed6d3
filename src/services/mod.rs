pub mod auth_session;
pub mod notifications;
pub mod quiz_authoring;

pub use auth_session::AuthSession;
pub use notifications::{Notification, NotificationCenter, NotificationKind};
pub use quiz_authoring::{AnswerDraft, QuestionDraft, QuizAuthoring, QuizDraft};
