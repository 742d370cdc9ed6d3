//! 流程层与出卷服务依赖的后端能力
//!
//! 上层只依赖这些 trait，不直接持有 HTTP 客户端，方便测试替换

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    AnswerUpdate, McqGeneration, NewAnswer, NewQuestion, NewQuiz, NewSubmission, Question,
    QuestionUpdate, Quiz, QuizStatistics,
};

#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// 拉取测验的全部题目（含选项）
    async fn fetch_questions(&self, quiz_id: i64) -> AppResult<Vec<Question>>;

    /// 提交一次答题成绩
    async fn submit_result(&self, submission: &NewSubmission) -> AppResult<()>;

    /// 测验统计，仅用于交卷后展示
    async fn fetch_quiz_statistics(&self, quiz_id: i64) -> AppResult<QuizStatistics>;
}

/// 出卷依赖的后端能力
///
/// 出卷服务只通过它建卷、改题、删卷，测试时可替换为记录调用顺序的实现
#[async_trait]
pub trait AuthoringBackend: Send + Sync {
    async fn create_quiz(&self, quiz: &NewQuiz) -> AppResult<Quiz>;

    /// 创建题目，返回新题目的 ID
    async fn create_question(&self, question: &NewQuestion) -> AppResult<i64>;

    async fn create_answer(&self, answer: &NewAnswer) -> AppResult<()>;

    async fn update_question(&self, update: &QuestionUpdate) -> AppResult<()>;

    async fn update_answer(&self, update: &AnswerUpdate) -> AppResult<()>;

    async fn delete_quiz(&self, quiz_id: i64) -> AppResult<()>;

    /// 上传 PDF 生成题目；提供 (标题, 作者) 时由后端同时建卷
    async fn generate_mcqs(
        &self,
        file_name: &str,
        pdf: Vec<u8>,
        num_questions: u32,
        create_as: Option<(&str, &str)>,
    ) -> AppResult<McqGeneration>;
}
