pub mod generation;
pub mod quiz;
pub mod user;

pub use generation::{GeneratedAnswer, GeneratedMcq, McqGeneration};
pub use quiz::{
    Answer, AnswerUpdate, CreatedQuestion, NewAnswer, NewQuestion, NewQuiz, NewSubmission,
    Question, QuestionUpdate, Quiz, QuizStatistics, SubmissionRecord,
};
pub use user::{LoginResponse, NewUser, TokenClaims, UserIdentity};
