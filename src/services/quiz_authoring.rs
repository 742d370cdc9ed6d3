//! 出卷服务 - 业务能力层
//!
//! 手动出卷：先建卷，再逐题建题目和选项；PDF 出题：上传文件交给后端生成。
//! 另有改题、改选项、删卷。

use crate::clients::AuthoringBackend;
use crate::error::{AppError, AppResult, FileError};
use crate::models::{
    AnswerUpdate, McqGeneration, NewAnswer, NewQuestion, NewQuiz, QuestionUpdate,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 上传文件大小上限（与后端一致）
const MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

/// 待创建的选项
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerDraft {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// 待创建的题目
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    #[serde(default)]
    pub answers: Vec<AnswerDraft>,
}

impl QuestionDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answers: Vec::new(),
        }
    }

    pub fn answer(mut self, text: impl Into<String>, is_correct: bool) -> Self {
        self.answers.push(AnswerDraft {
            text: text.into(),
            is_correct,
        });
        self
    }

    /// 每道题至少两个选项，且恰好一个正确
    pub fn validate(&self) -> AppResult<()> {
        if self.text.trim().is_empty() {
            return Err(AppError::Validation("题干不能为空".to_string()));
        }
        if self.answers.len() < 2 {
            return Err(AppError::Validation(format!(
                "题目 \"{}\" 至少需要两个选项",
                self.text
            )));
        }
        let correct = self.answers.iter().filter(|a| a.is_correct).count();
        if correct != 1 {
            return Err(AppError::Validation(format!(
                "题目 \"{}\" 需要恰好一个正确选项，当前 {} 个",
                self.text, correct
            )));
        }
        Ok(())
    }
}

/// 手写的测验定义（TOML 文件）
///
/// ```toml
/// title = "Rust 基础"
/// created_by = "alice"
///
/// [[questions]]
/// text = "2 + 2 = ?"
/// answers = [{ text = "4", is_correct = true }, { text = "5" }]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct QuizDraft {
    pub title: String,
    pub created_by: String,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

impl QuizDraft {
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(display.clone(), e))?;
        toml::from_str(&content).map_err(|e| {
            FileError::TomlParseFailed {
                path: display,
                source: e,
            }
            .into()
        })
    }
}

/// 出卷服务
pub struct QuizAuthoring {
    backend: Arc<dyn AuthoringBackend>,
}

impl QuizAuthoring {
    pub fn new(backend: Arc<dyn AuthoringBackend>) -> Self {
        Self { backend }
    }

    /// 按 TOML 定义建卷
    pub async fn create_from_draft(&self, draft: &QuizDraft) -> AppResult<i64> {
        self.create_quiz_with_questions(&draft.title, &draft.created_by, &draft.questions)
            .await
    }

    /// 创建测验及其全部题目，返回测验 ID
    ///
    /// 所有题目先在本地校验，任何一题不合格都不会发出请求
    pub async fn create_quiz_with_questions(
        &self,
        title: &str,
        created_by: &str,
        drafts: &[QuestionDraft],
    ) -> AppResult<i64> {
        validate_quiz(title, created_by, drafts)?;

        let quiz = self
            .backend
            .create_quiz(&NewQuiz {
                quiz_title: title.trim().to_string(),
                created_by: created_by.trim().to_string(),
                created_at: chrono::Local::now().naive_local(),
            })
            .await?;

        let quiz_id = match quiz.quiz_id {
            Some(id) if id != 0 => id,
            _ => return Err(AppError::Validation("后端未返回测验 ID".to_string())),
        };
        info!("✓ 测验已创建: {} (ID: {})", title, quiz_id);

        for (index, draft) in drafts.iter().enumerate() {
            let question_id = self
                .backend
                .create_question(&NewQuestion {
                    quiz_id,
                    question_text: draft.text.clone(),
                })
                .await?;

            for answer in &draft.answers {
                self.backend
                    .create_answer(&NewAnswer {
                        question_id,
                        answer_text: answer.text.clone(),
                        is_correct: answer.is_correct,
                    })
                    .await?;
            }
            info!("[测验 {}] ✓ 第 {}/{} 题已创建", quiz_id, index + 1, drafts.len());
        }

        Ok(quiz_id)
    }

    /// 修改题干
    pub async fn edit_question(
        &self,
        quiz_id: i64,
        question_id: i64,
        text: &str,
    ) -> AppResult<()> {
        let text = non_empty(text, "题干不能为空")?;
        self.backend
            .update_question(&QuestionUpdate {
                quiz_id,
                question_text: text,
                question_id,
            })
            .await?;
        info!("[测验 {}] ✓ 题目 {} 已修改", quiz_id, question_id);
        Ok(())
    }

    /// 修改选项内容及是否正确
    pub async fn edit_answer(
        &self,
        question_id: i64,
        answer_id: i64,
        text: &str,
        is_correct: bool,
    ) -> AppResult<()> {
        let text = non_empty(text, "选项内容不能为空")?;
        self.backend
            .update_answer(&AnswerUpdate {
                question_id,
                answer_id,
                answer_text: text,
                answer_true: is_correct,
            })
            .await?;
        info!("✓ 题目 {} 的选项 {} 已修改", question_id, answer_id);
        Ok(())
    }

    /// 删除测验（连同题目、选项、成绩）
    pub async fn delete_quiz(&self, quiz_id: i64) -> AppResult<()> {
        if quiz_id <= 0 {
            return Err(AppError::Validation(format!("无效的测验 ID: {}", quiz_id)));
        }
        self.backend.delete_quiz(quiz_id).await?;
        info!("🗑️ 测验 {} 已删除", quiz_id);
        Ok(())
    }

    /// 从 PDF 生成题目；提供 (标题, 作者) 时同时建卷
    pub async fn generate_from_pdf(
        &self,
        path: &Path,
        num_questions: u32,
        create_as: Option<(&str, &str)>,
    ) -> AppResult<McqGeneration> {
        if num_questions == 0 {
            return Err(AppError::Validation("题目数量必须大于 0".to_string()));
        }

        let bytes = read_pdf(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());

        info!(
            "📤 正在上传 {} ({} 字节)，生成 {} 道题...",
            file_name,
            bytes.len(),
            num_questions
        );

        let result = self
            .backend
            .generate_mcqs(&file_name, bytes, num_questions, create_as)
            .await?;

        if let Some(error) = &result.error {
            warn!("⚠️ 题目已生成但建卷失败: {}", error);
        } else {
            info!("✓ 已生成 {} 道题", result.num_questions);
        }

        Ok(result)
    }
}

fn non_empty(text: &str, message: &str) -> AppResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(text.to_string())
}

fn validate_quiz(title: &str, created_by: &str, drafts: &[QuestionDraft]) -> AppResult<()> {
    if title.trim().chars().count() < 3 {
        return Err(AppError::Validation("测验标题至少 3 个字符".to_string()));
    }
    if created_by.trim().chars().count() < 2 {
        return Err(AppError::Validation("作者名至少 2 个字符".to_string()));
    }
    drafts.iter().try_for_each(QuestionDraft::validate)
}

/// 读取并检查 PDF：扩展名、大小、%PDF 文件头
async fn read_pdf(path: &Path) -> AppResult<Vec<u8>> {
    let display = path.display().to_string();
    let is_pdf_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf_ext {
        return Err(FileError::NotPdf { path: display }.into());
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(display.clone(), e))?;

    if bytes.len() > MAX_PDF_BYTES {
        return Err(AppError::Validation(format!(
            "文件超过 10MB 上限: {}",
            display
        )));
    }
    if bytes.len() < 8 || !bytes.starts_with(b"%PDF") {
        return Err(FileError::NotPdf { path: display }.into());
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quiz;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录调用顺序的出卷后端
    #[derive(Default)]
    struct RecordingAuthoring {
        calls: Mutex<Vec<String>>,
        next_question_id: Mutex<i64>,
    }

    impl RecordingAuthoring {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuthoringBackend for RecordingAuthoring {
        async fn create_quiz(&self, quiz: &NewQuiz) -> AppResult<Quiz> {
            self.record(format!("quiz:{}", quiz.quiz_title));
            Ok(Quiz {
                quiz_id: Some(77),
                quiz_title: quiz.quiz_title.clone(),
                created_by: quiz.created_by.clone(),
                created_at: None,
            })
        }

        async fn create_question(&self, question: &NewQuestion) -> AppResult<i64> {
            let mut next = self.next_question_id.lock().unwrap();
            *next += 1;
            self.record(format!("question:{}:{}", question.quiz_id, question.question_text));
            Ok(100 + *next)
        }

        async fn create_answer(&self, answer: &NewAnswer) -> AppResult<()> {
            self.record(format!(
                "answer:{}:{}:{}",
                answer.question_id, answer.answer_text, answer.is_correct
            ));
            Ok(())
        }

        async fn update_question(&self, update: &QuestionUpdate) -> AppResult<()> {
            self.record(format!(
                "edit-question:{}:{}:{}",
                update.quiz_id, update.question_id, update.question_text
            ));
            Ok(())
        }

        async fn update_answer(&self, update: &AnswerUpdate) -> AppResult<()> {
            self.record(format!(
                "edit-answer:{}:{}:{}",
                update.answer_id, update.answer_text, update.answer_true
            ));
            Ok(())
        }

        async fn delete_quiz(&self, quiz_id: i64) -> AppResult<()> {
            self.record(format!("delete:{}", quiz_id));
            Ok(())
        }

        async fn generate_mcqs(
            &self,
            file_name: &str,
            _pdf: Vec<u8>,
            num_questions: u32,
            create_as: Option<(&str, &str)>,
        ) -> AppResult<McqGeneration> {
            self.record(format!(
                "generate:{}:{}:{}",
                file_name,
                num_questions,
                create_as.is_some()
            ));
            Ok(McqGeneration {
                message: None,
                num_questions: num_questions as usize,
                questions: Vec::new(),
                quiz_created: Some(create_as.is_some()),
                quiz_id: create_as.map(|_| 5),
                error: None,
            })
        }
    }

    fn authoring() -> (Arc<RecordingAuthoring>, QuizAuthoring) {
        let backend = Arc::new(RecordingAuthoring::default());
        (backend.clone(), QuizAuthoring::new(backend))
    }

    #[test]
    fn test_draft_requires_single_correct_answer() {
        let ok = QuestionDraft::new("2+2?").answer("4", true).answer("5", false);
        assert!(ok.validate().is_ok());

        let none = QuestionDraft::new("2+2?")
            .answer("4", false)
            .answer("5", false);
        assert!(none.validate().is_err());

        let two = QuestionDraft::new("2+2?")
            .answer("4", true)
            .answer("four", true);
        assert!(two.validate().is_err());

        let single = QuestionDraft::new("2+2?").answer("4", true);
        assert!(single.validate().is_err());
    }

    #[test]
    fn test_quiz_title_and_author_checked() {
        let drafts = vec![QuestionDraft::new("q").answer("a", true).answer("b", false)];
        assert!(validate_quiz("ab", "me", &drafts).is_err());
        assert!(validate_quiz("Rust basics", "m", &drafts).is_err());
        assert!(validate_quiz("Rust basics", "me", &drafts).is_ok());
    }

    #[tokio::test]
    async fn test_create_quiz_then_questions_then_answers() {
        let (backend, authoring) = authoring();
        let drafts = vec![
            QuestionDraft::new("2+2?").answer("4", true).answer("5", false),
            QuestionDraft::new("3*3?").answer("6", false).answer("9", true),
        ];

        let quiz_id = authoring
            .create_quiz_with_questions("Arithmetic", "alice", &drafts)
            .await
            .unwrap();

        assert_eq!(quiz_id, 77);
        assert_eq!(
            backend.calls(),
            vec![
                "quiz:Arithmetic",
                "question:77:2+2?",
                "answer:101:4:true",
                "answer:101:5:false",
                "question:77:3*3?",
                "answer:102:6:false",
                "answer:102:9:true",
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_quiz_sends_nothing() {
        let (backend, authoring) = authoring();
        let drafts = vec![
            QuestionDraft::new("ok").answer("a", true).answer("b", false),
            QuestionDraft::new("broken").answer("a", true),
        ];

        let err = authoring
            .create_quiz_with_questions("Arithmetic", "alice", &drafts)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_and_delete() {
        let (backend, authoring) = authoring();

        authoring.edit_question(3, 8, "  new text ").await.unwrap();
        authoring.edit_answer(8, 21, "forty-two", true).await.unwrap();
        authoring.delete_quiz(3).await.unwrap();
        assert!(authoring.edit_question(3, 8, "   ").await.is_err());
        assert!(authoring.delete_quiz(0).await.is_err());

        assert_eq!(
            backend.calls(),
            vec![
                "edit-question:3:8:new text",
                "edit-answer:21:forty-two:true",
                "delete:3",
            ]
        );
    }

    #[tokio::test]
    async fn test_quiz_draft_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.toml");
        std::fs::write(
            &path,
            r#"
title = "Rust basics"
created_by = "alice"

[[questions]]
text = "Which keyword declares a variable?"
answers = [{ text = "let", is_correct = true }, { text = "var" }]
"#,
        )
        .unwrap();

        let draft = QuizDraft::from_toml_file(&path).unwrap();
        assert_eq!(draft.questions.len(), 1);
        assert!(!draft.questions[0].answers[1].is_correct);

        let (backend, authoring) = authoring();
        assert_eq!(authoring.create_from_draft(&draft).await.unwrap(), 77);
        assert_eq!(backend.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_generate_rejects_zero_questions_before_upload() {
        let (backend, authoring) = authoring();
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("notes.pdf");
        tokio::fs::write(&pdf, b"%PDF-1.7\n%...").await.unwrap();

        assert!(authoring.generate_from_pdf(&pdf, 0, None).await.is_err());
        assert!(backend.calls().is_empty());

        let result = authoring
            .generate_from_pdf(&pdf, 3, Some(("Notes", "bob")))
            .await
            .unwrap();
        assert_eq!(result.quiz_id, Some(5));
        assert_eq!(backend.calls(), vec!["generate:notes.pdf:3:true"]);
    }

    #[tokio::test]
    async fn test_read_pdf_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("notes.txt");
        tokio::fs::write(&txt, b"%PDF-1.7 fake").await.unwrap();
        assert!(read_pdf(&txt).await.is_err());

        let fake = dir.path().join("fake.pdf");
        tokio::fs::write(&fake, b"hello world, not a pdf").await.unwrap();
        assert!(read_pdf(&fake).await.is_err());

        let real = dir.path().join("real.pdf");
        tokio::fs::write(&real, b"%PDF-1.7\n%...").await.unwrap();
        assert!(read_pdf(&real).await.is_ok());
    }
}
