//! 测验、题目、选项等 REST 载荷
//!
//! 字段名与后端 JSON 保持一致

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// 题目选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer_id: i64,
    pub answer_text: String,
    /// 是否为正确选项（后端随题目一起下发）
    #[serde(default)]
    pub is_correct: bool,
}

/// 带选项的题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: i64,
    pub question_text: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Question {
    /// 标准答案：第一个标记为正确的选项，没有则返回 None
    pub fn correct_answer_id(&self) -> Option<i64> {
        self.answers
            .iter()
            .find(|a| a.is_correct)
            .map(|a| a.answer_id)
    }
}

/// 测验
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub quiz_id: Option<i64>,
    pub quiz_title: String,
    pub created_by: String,
    /// 后端原样返回的时间字符串
    #[serde(default)]
    pub created_at: Option<String>,
}

/// 创建测验请求
#[derive(Debug, Clone, Serialize)]
pub struct NewQuiz {
    pub quiz_title: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

/// 创建题目请求
#[derive(Debug, Clone, Serialize)]
pub struct NewQuestion {
    pub quiz_id: i64,
    pub question_text: String,
}

/// 创建题目的响应 `{"Question": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedQuestion {
    #[serde(rename = "Question")]
    pub question: CreatedQuestionBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedQuestionBody {
    pub question_id: i64,
    #[serde(default)]
    pub quiz_id: Option<i64>,
    #[serde(default)]
    pub question_text: Option<String>,
}

/// 创建选项请求
#[derive(Debug, Clone, Serialize)]
pub struct NewAnswer {
    pub question_id: i64,
    pub answer_text: String,
    pub is_correct: bool,
}

/// 修改题目请求
#[derive(Debug, Clone, Serialize)]
pub struct QuestionUpdate {
    pub quiz_id: i64,
    pub question_text: String,
    pub question_id: i64,
}

/// 修改选项请求（后端字段名为 answer_true）
#[derive(Debug, Clone, Serialize)]
pub struct AnswerUpdate {
    pub question_id: i64,
    pub answer_id: i64,
    pub answer_text: String,
    pub answer_true: bool,
}

/// 提交成绩请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSubmission {
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

/// 历史提交记录
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRecord {
    #[serde(default)]
    pub submission_id: Option<i64>,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// 测验统计
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizStatistics {
    #[serde(default)]
    pub quiz_id: Option<i64>,
    pub average_score: f64,
    #[serde(default)]
    pub average_percentage: Option<f64>,
    pub best_score: i64,
    #[serde(default)]
    pub best_percentage: Option<f64>,
    pub total_attempts: i64,
    pub total_questions: i64,
}
