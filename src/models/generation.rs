//! PDF 出题结果

use serde::Deserialize;

/// 生成的单选题
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedMcq {
    pub question_text: String,
    #[serde(default)]
    pub answers: Vec<GeneratedAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedAnswer {
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// 生成接口响应；仅当同时提供标题和作者时才会建卷
#[derive(Debug, Clone, Deserialize)]
pub struct McqGeneration {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub num_questions: usize,
    #[serde(default)]
    pub questions: Vec<GeneratedMcq>,
    #[serde(default)]
    pub quiz_created: Option<bool>,
    #[serde(default)]
    pub quiz_id: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}
