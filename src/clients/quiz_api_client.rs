/// 测验后端 API 客户端
///
/// 封装所有与后端 REST API 相关的调用逻辑
use crate::clients::backend::{AuthoringBackend, QuizBackend};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{
    AnswerUpdate, CreatedQuestion, LoginResponse, McqGeneration, NewAnswer, NewQuestion, NewQuiz,
    NewSubmission, NewUser, Question, QuestionUpdate, Quiz, QuizStatistics, SubmissionRecord,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// 测验后端客户端
#[derive(Clone)]
pub struct QuizApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl QuizApiClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// 设置登录后拿到的 token，之后的请求都会带上 Bearer 头
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========== 用户 ==========

    /// 登录（表单提交 username/password）
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let endpoint = "/Users/login";
        let request = self
            .http
            .post(self.url(endpoint))
            .form(&[("username", email), ("password", password)]);
        self.send_json(endpoint, request).await
    }

    /// 注册
    pub async fn register(&self, email: &str, password: &str) -> AppResult<Value> {
        let endpoint = "/Users/createUser";
        let body = NewUser {
            user_email: email.to_string(),
            hashed_password: password.to_string(),
        };
        let request = self.http.post(self.url(endpoint)).json(&body);
        self.send_json(endpoint, request).await
    }

    // ========== 测验 ==========

    pub async fn list_quizzes(&self) -> AppResult<Vec<Quiz>> {
        let endpoint = "/Quizzes/getQuizzes";
        let request = self.http.get(self.url(endpoint));
        self.send_json(endpoint, request).await
    }

    pub async fn create_quiz(&self, quiz: &NewQuiz) -> AppResult<Quiz> {
        let endpoint = "/Quizzes/createQuiz";
        let request = self.http.post(self.url(endpoint)).json(quiz);
        self.send_json(endpoint, request).await
    }

    pub async fn delete_quiz(&self, quiz_id: i64) -> AppResult<Value> {
        let endpoint = "/Quizzes/deleteQuiz";
        let request = self
            .http
            .delete(self.url(endpoint))
            .query(&[("quiz_id", quiz_id)]);
        self.send_json(endpoint, request).await
    }

    // ========== 题目与选项 ==========

    pub async fn questions_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<Question>> {
        let endpoint = "/Questions/getQuizQuestions";
        let request = self
            .http
            .get(self.url(endpoint))
            .query(&[("quiz_id", quiz_id)]);
        self.send_json(endpoint, request).await
    }

    /// 创建题目，返回新题目的 ID
    pub async fn create_question(&self, question: &NewQuestion) -> AppResult<i64> {
        let endpoint = "/Questions/createQuestion";
        let request = self.http.post(self.url(endpoint)).json(question);
        let created: CreatedQuestion = self.send_json(endpoint, request).await?;
        Ok(created.question.question_id)
    }

    pub async fn update_question(&self, update: &QuestionUpdate) -> AppResult<Value> {
        let endpoint = "/Questions/editQuestion";
        let request = self.http.put(self.url(endpoint)).json(update);
        self.send_json(endpoint, request).await
    }

    pub async fn create_answer(&self, answer: &NewAnswer) -> AppResult<Value> {
        let endpoint = "/Answers/createAnswer";
        let request = self.http.post(self.url(endpoint)).json(answer);
        self.send_json(endpoint, request).await
    }

    pub async fn update_answer(&self, update: &AnswerUpdate) -> AppResult<Value> {
        let endpoint = "/Answers/editAnswer";
        let request = self.http.put(self.url(endpoint)).json(update);
        self.send_json(endpoint, request).await
    }

    // ========== 提交与统计 ==========

    pub async fn create_submission(&self, submission: &NewSubmission) -> AppResult<Value> {
        let endpoint = "/Submissions/createSubmission";
        debug!("提交成绩 Payload: {:?}", submission);
        let request = self.http.post(self.url(endpoint)).json(submission);
        self.send_json(endpoint, request).await
    }

    pub async fn submissions_by_user(&self, user_id: i64) -> AppResult<Vec<SubmissionRecord>> {
        let endpoint = "/Submissions/getSubmissionByUser";
        let request = self
            .http
            .get(self.url(endpoint))
            .query(&[("user_id", user_id)]);
        self.send_json(endpoint, request).await
    }

    /// 排行榜：按分数降序、提交时间升序
    pub async fn leaderboard_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<SubmissionRecord>> {
        let endpoint = "/Submissions/getLeaderboardByQuiz";
        let request = self
            .http
            .get(self.url(endpoint))
            .query(&[("quiz_id", quiz_id)]);
        self.send_json(endpoint, request).await
    }

    pub async fn quiz_statistics(&self, quiz_id: i64) -> AppResult<QuizStatistics> {
        let endpoint = "/Submissions/getQuizStatistics";
        let request = self
            .http
            .get(self.url(endpoint))
            .query(&[("quiz_id", quiz_id)]);
        self.send_json(endpoint, request).await
    }

    // ========== PDF 出题 ==========

    /// 只生成题目，不建卷
    pub async fn generate_mcqs(
        &self,
        file_name: &str,
        pdf: Vec<u8>,
        num_questions: u32,
    ) -> AppResult<McqGeneration> {
        let endpoint = "/PDF_MCQ/generate-mcqs-only";
        let form = Self::pdf_form(endpoint, file_name, pdf, num_questions)?;
        let request = self.http.post(self.url(endpoint)).multipart(form);
        self.send_json(endpoint, request).await
    }

    /// 生成题目并以 title/created_by 建卷
    pub async fn generate_mcqs_and_create_quiz(
        &self,
        file_name: &str,
        pdf: Vec<u8>,
        num_questions: u32,
        quiz_title: &str,
        created_by: &str,
    ) -> AppResult<McqGeneration> {
        let endpoint = "/PDF_MCQ/generate-mcqs";
        let form = Self::pdf_form(endpoint, file_name, pdf, num_questions)?
            .text("quiz_title", quiz_title.to_string())
            .text("created_by", created_by.to_string());
        let request = self.http.post(self.url(endpoint)).multipart(form);
        self.send_json(endpoint, request).await
    }

    // ========== 辅助函数 ==========

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn pdf_form(
        endpoint: &str,
        file_name: &str,
        pdf: Vec<u8>,
        num_questions: u32,
    ) -> AppResult<Form> {
        let part = Part::bytes(pdf)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        Ok(Form::new()
            .part("file", part)
            .text("num_questions", num_questions.to_string()))
    }

    /// 发送请求并把响应体解析为 T
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> AppResult<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let body = Self::read_success_body(endpoint, response).await?;

        serde_json::from_str(&body).map_err(|e| {
            ApiError::JsonParseFailed {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            }
            .into()
        })
    }

    async fn read_success_body(endpoint: &str, response: Response) -> AppResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        debug!("{} -> {} ({} 字节)", endpoint, status, body.len());

        if status.is_success() {
            Ok(body)
        } else {
            Err(AppError::bad_response(
                endpoint,
                status.as_u16(),
                extract_detail(&body),
            ))
        }
    }
}

/// 提取 FastAPI 风格的错误信息 `{"detail": ...}`
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;
    Some(match detail.as_str() {
        Some(s) => s.to_string(),
        None => detail.to_string(),
    })
}

#[async_trait]
impl QuizBackend for QuizApiClient {
    async fn fetch_questions(&self, quiz_id: i64) -> AppResult<Vec<Question>> {
        self.questions_by_quiz(quiz_id).await
    }

    async fn submit_result(&self, submission: &NewSubmission) -> AppResult<()> {
        self.create_submission(submission).await.map(|_| ())
    }

    async fn fetch_quiz_statistics(&self, quiz_id: i64) -> AppResult<QuizStatistics> {
        self.quiz_statistics(quiz_id).await
    }
}

#[async_trait]
impl AuthoringBackend for QuizApiClient {
    async fn create_quiz(&self, quiz: &NewQuiz) -> AppResult<Quiz> {
        QuizApiClient::create_quiz(self, quiz).await
    }

    async fn create_question(&self, question: &NewQuestion) -> AppResult<i64> {
        QuizApiClient::create_question(self, question).await
    }

    async fn create_answer(&self, answer: &NewAnswer) -> AppResult<()> {
        QuizApiClient::create_answer(self, answer).await.map(|_| ())
    }

    async fn update_question(&self, update: &QuestionUpdate) -> AppResult<()> {
        QuizApiClient::update_question(self, update).await.map(|_| ())
    }

    async fn update_answer(&self, update: &AnswerUpdate) -> AppResult<()> {
        QuizApiClient::update_answer(self, update).await.map(|_| ())
    }

    async fn delete_quiz(&self, quiz_id: i64) -> AppResult<()> {
        QuizApiClient::delete_quiz(self, quiz_id).await.map(|_| ())
    }

    async fn generate_mcqs(
        &self,
        file_name: &str,
        pdf: Vec<u8>,
        num_questions: u32,
        create_as: Option<(&str, &str)>,
    ) -> AppResult<McqGeneration> {
        match create_as {
            Some((title, created_by)) => {
                self.generate_mcqs_and_create_quiz(file_name, pdf, num_questions, title, created_by)
                    .await
            }
            None => QuizApiClient::generate_mcqs(self, file_name, pdf, num_questions).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        let body = r#"{"detail": "Invalid username or password"}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("Invalid username or password")
        );
    }

    #[test]
    fn test_extract_detail_structured() {
        let body = r#"{"detail": [{"loc": ["body", "score"], "msg": "field required"}]}"#;
        let detail = extract_detail(body).unwrap();
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_extract_detail_missing() {
        assert!(extract_detail("not json").is_none());
        assert!(extract_detail(r#"{"Quiz": "Deleted"}"#).is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = Config {
            api_base_url: "http://localhost:8000/".to_string(),
            ..Config::default()
        };
        let client = QuizApiClient::new(&config);
        assert_eq!(client.url("/Quizzes/getQuizzes"), "http://localhost:8000/Quizzes/getQuizzes");
    }

    /// 需要本地运行后端：cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_list_quizzes_live() {
        let client = QuizApiClient::new(&Config::from_env().unwrap());
        let quizzes = client.list_quizzes().await.expect("拉取测验列表失败");
        println!("共有 {} 个测验", quizzes.len());
    }
}
