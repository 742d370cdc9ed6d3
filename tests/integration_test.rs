use async_trait::async_trait;
use quiz_client::error::AppResult;
use quiz_client::models::{Answer, NewSubmission, Question, QuizStatistics, UserIdentity};
use quiz_client::workflow::{
    AttemptCommand, AttemptController, AttemptCtx, AttemptSession, ScoreSummary, SessionEvent,
};
use quiz_client::{
    AppError, Config, NotificationCenter, NotificationKind, QuizApiClient, QuizBackend,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_test::{assert_pending, assert_ready, task};

/// 内存后端：返回固定题目并记录所有提交
#[derive(Default)]
struct RecordingBackend {
    questions: Vec<Question>,
    fail_submit: bool,
    submissions: Mutex<Vec<NewSubmission>>,
}

#[async_trait]
impl QuizBackend for RecordingBackend {
    async fn fetch_questions(&self, _quiz_id: i64) -> AppResult<Vec<Question>> {
        Ok(self.questions.clone())
    }

    async fn submit_result(&self, submission: &NewSubmission) -> AppResult<()> {
        // 模拟网络延迟，让 tick 有机会在提交途中排队
        tokio::time::sleep(Duration::from_secs(2)).await;
        self.submissions.lock().unwrap().push(submission.clone());
        if self.fail_submit {
            return Err(AppError::bad_response("/Submissions/createSubmission", 503, None));
        }
        Ok(())
    }

    async fn fetch_quiz_statistics(&self, quiz_id: i64) -> AppResult<QuizStatistics> {
        Ok(QuizStatistics {
            quiz_id: Some(quiz_id),
            average_score: 1.0,
            average_percentage: Some(50.0),
            best_score: 1,
            best_percentage: Some(50.0),
            total_attempts: self.submissions.lock().unwrap().len() as i64,
            total_questions: self.questions.len() as i64,
        })
    }
}

/// 两道题，Q1 / Q2 的正确答案都是 A1（ID 分别为 11 / 21）
fn two_question_quiz() -> Vec<Question> {
    let q = |id: i64, correct: i64, wrong: i64| Question {
        question_id: id,
        question_text: format!("Question {}", id),
        answers: vec![
            Answer {
                answer_id: correct,
                answer_text: "A1".to_string(),
                is_correct: true,
            },
            Answer {
                answer_id: wrong,
                answer_text: "A2".to_string(),
                is_correct: false,
            },
        ],
    };
    vec![q(1, 11, 12), q(2, 21, 22)]
}

fn ctx(notifier: NotificationCenter) -> AttemptCtx {
    AttemptCtx::new(
        UserIdentity {
            id: 1,
            email: "student@quiz.app".to_string(),
        },
        notifier,
        300,
    )
}

async fn start(backend: Arc<RecordingBackend>, notifier: NotificationCenter) -> AttemptController {
    AttemptController::start(ctx(notifier), backend, 42)
        .await
        .expect("加载题目失败")
}

#[tokio::test(start_paused = true)]
async fn test_manual_submit_before_expiry() {
    let backend = Arc::new(RecordingBackend {
        questions: two_question_quiz(),
        ..Default::default()
    });
    let controller = start(backend.clone(), NotificationCenter::default()).await;

    let (tx, rx) = mpsc::channel(8);
    for command in [
        AttemptCommand::SelectOption(1),
        AttemptCommand::Advance,
        AttemptCommand::SelectOption(2),
        AttemptCommand::Submit,
        // 交卷后的重复交卷不会再提交
        AttemptCommand::Submit,
    ] {
        tx.send(command).await.unwrap();
    }

    let report = AttemptSession::new(controller).run(rx, |_, _| {}).await;

    assert!(report.finalized);
    assert_eq!(
        report.summary,
        Some(ScoreSummary {
            correct: 1,
            wrong: 1,
            total: 2
        })
    );

    let submissions = backend.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].score, 1);
    assert_eq!(submissions[0].quiz_id, 42);
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn test_timer_expiry_auto_submits_once() {
    let backend = Arc::new(RecordingBackend {
        questions: two_question_quiz(),
        ..Default::default()
    });
    let controller = start(backend.clone(), NotificationCenter::default()).await;

    // 保持发送端存活，只靠倒计时结束
    let (tx, rx) = mpsc::channel(8);
    let mut ticks = 0;
    let mut finished = 0;

    let report = AttemptSession::new(controller)
        .run(rx, |_, event| match event {
            SessionEvent::Tick(_) => ticks += 1,
            SessionEvent::Finished => finished += 1,
            _ => {}
        })
        .await;

    assert!(report.finalized);
    assert_eq!(
        report.summary,
        Some(ScoreSummary {
            correct: 0,
            wrong: 2,
            total: 2
        })
    );
    assert_eq!(ticks, 300);
    assert_eq!(finished, 1);
    assert_eq!(backend.submissions.lock().unwrap().len(), 1);
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn test_submit_failure_reported_and_not_retried() {
    let backend = Arc::new(RecordingBackend {
        questions: two_question_quiz(),
        fail_submit: true,
        ..Default::default()
    });
    let notifier = NotificationCenter::default();
    let controller = start(backend.clone(), notifier.clone()).await;

    let (tx, rx) = mpsc::channel(8);
    tx.send(AttemptCommand::Submit).await.unwrap();

    let report = AttemptSession::new(controller).run(rx, |_, _| {}).await;

    assert!(report.finalized);
    assert!(report.summary.is_none());
    assert!(report.submit_error.is_some());
    assert_eq!(backend.submissions.lock().unwrap().len(), 1);

    let errors: Vec<_> = notifier
        .active(Instant::now())
        .into_iter()
        .filter(|n| n.kind == NotificationKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn test_quit_leaves_without_submitting() {
    let backend = Arc::new(RecordingBackend {
        questions: two_question_quiz(),
        ..Default::default()
    });
    let controller = start(backend.clone(), NotificationCenter::default()).await;

    let (tx, rx) = mpsc::channel(8);
    tx.send(AttemptCommand::SelectOption(1)).await.unwrap();
    tx.send(AttemptCommand::Quit).await.unwrap();

    let report = AttemptSession::new(controller).run(rx, |_, _| {}).await;

    assert!(!report.finalized);
    assert!(report.summary.is_none());
    assert!(backend.submissions.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_commands_reported() {
    let backend = Arc::new(RecordingBackend {
        questions: two_question_quiz(),
        ..Default::default()
    });
    let controller = start(backend, NotificationCenter::default()).await;

    let (tx, rx) = mpsc::channel(8);
    tx.send(AttemptCommand::SelectOption(9)).await.unwrap();
    tx.send(AttemptCommand::Advance).await.unwrap();
    tx.send(AttemptCommand::Advance).await.unwrap();
    tx.send(AttemptCommand::Submit).await.unwrap();

    let mut rejected = Vec::new();
    AttemptSession::new(controller)
        .run(rx, |controller, event| {
            if let SessionEvent::Rejected(command) = event {
                rejected.push((command, controller.current_index()));
            }
        })
        .await;

    assert_eq!(
        rejected,
        vec![
            (AttemptCommand::SelectOption(9), 0),
            (AttemptCommand::Advance, 1),
        ]
    );
    drop(tx);
}

#[tokio::test]
async fn test_statistics_through_backend_trait() {
    let backend: Arc<dyn QuizBackend> = Arc::new(RecordingBackend {
        questions: two_question_quiz(),
        ..Default::default()
    });
    let stats = backend.fetch_quiz_statistics(42).await.unwrap();
    assert_eq!(stats.total_questions, 2);
    assert_eq!(stats.quiz_id, Some(42));
}

#[tokio::test(start_paused = true)]
async fn test_session_waits_for_input_until_quit() {
    let backend = Arc::new(RecordingBackend {
        questions: two_question_quiz(),
        ..Default::default()
    });
    let controller = start(backend.clone(), NotificationCenter::default()).await;

    let (tx, rx) = mpsc::channel(8);
    let mut session = task::spawn(AttemptSession::new(controller).run(rx, |_, _| {}));

    // 没有输入、第一秒未到，会话挂起等待
    assert_pending!(session.poll());

    tx.send(AttemptCommand::SelectOption(1)).await.unwrap();
    assert!(session.is_woken());
    assert_pending!(session.poll());

    tx.send(AttemptCommand::Quit).await.unwrap();
    assert!(session.is_woken());
    let report = assert_ready!(session.poll());

    assert!(!report.finalized);
    assert!(backend.submissions.lock().unwrap().is_empty());
}

#[tokio::test]
#[ignore] // 默认忽略，需要本地后端：cargo test -- --ignored
async fn test_live_backend_quiz_list() {
    quiz_client::logger::init();

    let config = Config::from_env().expect("配置无效");
    let client = QuizApiClient::new(&config);

    let quizzes = client.list_quizzes().await.expect("获取测验列表失败");
    println!("找到 {} 个测验", quizzes.len());
}
