//! 终端测验客户端 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：启动日志、创建后端客户端、恢复或建立登录状态
//! 2. **指令分发**：注册、列出测验、答题、统计、排行榜、历史成绩、出卷、改题、删卷、PDF 出题
//! 3. **答题编排**：把标准输入转成答题指令，交给 `AttemptSession` 串行处理
//!
//! 不处理单题细节，向下委托 workflow / services。

use crate::clients::{QuizApiClient, QuizBackend};
use crate::config::Config;
use crate::services::auth_session::validate_registration;
use crate::services::{AuthSession, NotificationCenter, QuizAuthoring, QuizDraft};
use crate::utils::logging::{
    log_startup, print_attempt_summary, print_notification, print_statistics, render_question,
};
use crate::utils::truncate_text;
use crate::workflow::{
    AttemptCommand, AttemptController, AttemptCtx, AttemptSession, SessionEvent,
};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

const USAGE: &str = "用法:
  quiz_client [list]                                          列出全部测验
  quiz_client register <邮箱> <密码>                          注册账号
  quiz_client take <quiz_id>                                  开始答题
  quiz_client stats <quiz_id>                                 查看测验统计
  quiz_client leaderboard <quiz_id>                           查看排行榜
  quiz_client history                                         查看我的成绩
  quiz_client create <quiz.toml>                              按 TOML 定义出卷
  quiz_client edit-question <quiz_id> <question_id> <题干>    修改题目
  quiz_client edit-answer <question_id> <answer_id> <true|false> <内容>  修改选项
  quiz_client delete <quiz_id>                                删除测验
  quiz_client generate <pdf> <题数> [标题 作者]               从 PDF 出题
  quiz_client logout                                          退出登录";

/// 应用主结构
pub struct App {
    config: Config,
    client: QuizApiClient,
    session: AuthSession,
    notifier: NotificationCenter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let mut client = QuizApiClient::new(&config);
        let mut session = AuthSession::load(&config.session_file);

        if !session.is_authenticated() {
            if let (Some(email), Some(password)) = (&config.login_email, &config.login_password) {
                info!("🔑 正在登录: {}", email);
                let response = client
                    .login(email, password)
                    .await
                    .context("登录失败")?;
                session.login(response.access_token).context("登录 token 无效")?;
            }
        }
        client.set_token(session.token().map(str::to_string));

        let notifier =
            NotificationCenter::new(Duration::from_millis(config.notification_duration_ms));

        Ok(Self {
            config,
            client,
            session,
            notifier,
        })
    }

    /// 按命令行参数执行
    pub async fn run(&mut self, args: &[String]) -> Result<()> {
        let arg = |i: usize| args.get(i).map(String::as_str);

        match arg(0) {
            None | Some("list") => self.list_quizzes().await,
            Some("register") => {
                let email = arg(1).context("缺少邮箱")?;
                let password = arg(2).context("缺少密码")?;
                self.register(email, password).await
            }
            Some("take") => self.take_quiz(parse_id(arg(1))?).await,
            Some("stats") => self.show_statistics(parse_id(arg(1))?).await,
            Some("leaderboard") => self.show_leaderboard(parse_id(arg(1))?).await,
            Some("history") => self.show_history().await,
            Some("create") => {
                let path = arg(1).context("缺少测验定义文件")?;
                let draft = QuizDraft::from_toml_file(Path::new(path))?;
                let quiz_id = self.authoring().create_from_draft(&draft).await?;
                info!("✓ 已出卷: {} (ID: {})", draft.title, quiz_id);
                Ok(())
            }
            Some("edit-question") => {
                let quiz_id = parse_id(arg(1))?;
                let question_id = parse_id(arg(2))?;
                let text = rest_text(args, 3).context("缺少题干")?;
                Ok(self
                    .authoring()
                    .edit_question(quiz_id, question_id, &text)
                    .await?)
            }
            Some("edit-answer") => {
                let question_id = parse_id(arg(1))?;
                let answer_id = parse_id(arg(2))?;
                let is_correct = parse_flag(arg(3))?;
                let text = rest_text(args, 4).context("缺少选项内容")?;
                Ok(self
                    .authoring()
                    .edit_answer(question_id, answer_id, &text, is_correct)
                    .await?)
            }
            Some("delete") => Ok(self.authoring().delete_quiz(parse_id(arg(1))?).await?),
            Some("generate") => {
                let path = arg(1).context("缺少 PDF 路径")?;
                let count: u32 = arg(2)
                    .context("缺少题目数量")?
                    .parse()
                    .context("题目数量必须是正整数")?;
                let create_as = arg(3).zip(arg(4));
                self.generate(Path::new(path), count, create_as).await
            }
            Some("logout") => {
                self.session.logout();
                self.client.set_token(None);
                Ok(())
            }
            Some(other) => {
                warn!("未知命令: {}", other);
                println!("{}", USAGE);
                Ok(())
            }
        }
    }

    fn authoring(&self) -> QuizAuthoring {
        QuizAuthoring::new(Arc::new(self.client.clone()))
    }

    async fn register(&self, email: &str, password: &str) -> Result<()> {
        validate_registration(email, password)?;
        self.client
            .register(email.trim(), password)
            .await
            .context("注册失败")?;
        info!("✓ 注册成功: {}，请设置 QUIZ_EMAIL / QUIZ_PASSWORD 后登录", email.trim());
        Ok(())
    }

    async fn list_quizzes(&self) -> Result<()> {
        info!("\n📋 正在获取测验列表...");
        let quizzes = self.client.list_quizzes().await?;

        if quizzes.is_empty() {
            warn!("⚠️ 还没有任何测验");
            return Ok(());
        }

        info!("✓ 共 {} 个测验", quizzes.len());
        for quiz in &quizzes {
            println!(
                "  #{:<5} {}  (作者: {})",
                quiz.quiz_id.unwrap_or_default(),
                truncate_text(&quiz.quiz_title, 40),
                quiz.created_by
            );
        }
        Ok(())
    }

    /// 答题：加载 → 串行处理指令与倒计时 → 打印结果与统计
    async fn take_quiz(&self, quiz_id: i64) -> Result<()> {
        let user = self
            .session
            .require_user()
            .context("答题前请先登录（设置 QUIZ_EMAIL / QUIZ_PASSWORD）")?
            .clone();

        let ctx = AttemptCtx::from_config(&self.config, user, self.notifier.clone());
        let backend: Arc<dyn QuizBackend> = Arc::new(self.client.clone());

        let mut last_seen = 0;

        let controller = match AttemptController::start(ctx, backend.clone(), quiz_id).await {
            Ok(controller) => controller,
            Err(e) if e.is_load_error() => {
                show_notifications(&self.notifier, &mut last_seen);
                warn!("测验 {} 无法开始: {}", quiz_id, e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let (tx, rx) = mpsc::channel(16);
        let stdin_task = tokio::spawn(forward_stdin(tx));

        let report = AttemptSession::new(controller)
            .run(rx, |controller, event| {
                match event {
                    SessionEvent::Started | SessionEvent::Command(_) => {
                        if !controller.is_finalized() {
                            render_question(&controller.view());
                        }
                    }
                    SessionEvent::Rejected(command) => warn!("指令无效: {:?}", command),
                    SessionEvent::Tick(remaining) if remaining <= 10 || remaining % 60 == 0 => {
                        println!("⏱️ 剩余 {}", crate::workflow::format_mm_ss(remaining));
                    }
                    SessionEvent::Tick(_) | SessionEvent::Finished => {}
                }
                show_notifications(&self.notifier, &mut last_seen);
            })
            .await;

        stdin_task.abort();

        print_attempt_summary(quiz_id, &report);
        show_notifications(&self.notifier, &mut last_seen);
        self.notifier.prune(Instant::now());

        if report.finalized {
            match backend.fetch_quiz_statistics(quiz_id).await {
                Ok(stats) => print_statistics(&stats),
                Err(e) => warn!("⚠️ 该测验暂无统计数据: {}", e),
            }
        }
        Ok(())
    }

    async fn show_statistics(&self, quiz_id: i64) -> Result<()> {
        let stats = self
            .client
            .quiz_statistics(quiz_id)
            .await
            .with_context(|| format!("测验 {} 暂无统计数据", quiz_id))?;
        print_statistics(&stats);
        Ok(())
    }

    async fn show_leaderboard(&self, quiz_id: i64) -> Result<()> {
        let records = self.client.leaderboard_by_quiz(quiz_id).await?;
        info!("🏆 测验 {} 排行榜", quiz_id);
        for (rank, record) in records.iter().enumerate() {
            println!(
                "  {:>3}. 用户 #{:<5} 得分 {:<4} {}",
                rank + 1,
                record.user_id,
                record.score,
                record.submitted_at.as_deref().unwrap_or("-")
            );
        }
        Ok(())
    }

    async fn show_history(&self) -> Result<()> {
        let user = self.session.require_user().context("请先登录")?;
        let records = self.client.submissions_by_user(user.id).await?;
        info!("📜 {} 的成绩记录 ({} 条)", user.email, records.len());
        for record in &records {
            println!(
                "  测验 #{:<5} 得分 {:<4} {}",
                record.quiz_id,
                record.score,
                record.submitted_at.as_deref().unwrap_or("-")
            );
        }
        Ok(())
    }

    async fn generate(
        &self,
        path: &Path,
        count: u32,
        create_as: Option<(&str, &str)>,
    ) -> Result<()> {
        let result = self
            .authoring()
            .generate_from_pdf(path, count, create_as)
            .await?;

        for (i, mcq) in result.questions.iter().enumerate() {
            println!("{}. {}", i + 1, mcq.question_text);
            for answer in &mcq.answers {
                let mark = if answer.is_correct { "✓" } else { " " };
                println!("   [{}] {}", mark, answer.answer_text);
            }
        }
        if let Some(quiz_id) = result.quiz_id {
            info!("✓ 已建卷，测验 ID: {}", quiz_id);
        }
        Ok(())
    }
}

/// 打印上次展示之后新到的通知，`last_seen` 记录已展示的最大 ID
fn show_notifications(notifier: &NotificationCenter, last_seen: &mut u64) -> usize {
    let fresh = notifier.active_after(*last_seen, Instant::now());
    for notification in &fresh {
        print_notification(notification);
        *last_seen = notification.id;
    }
    fresh.len()
}

/// 把标准输入逐行转成答题指令，直到 Quit、输入结束或接收端关闭
async fn forward_stdin(tx: mpsc::Sender<AttemptCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(command) = parse_command(&line) else {
            warn!("无法识别的输入: {}", line.trim());
            continue;
        };
        if tx.send(command).await.is_err() || command == AttemptCommand::Quit {
            break;
        }
    }
}

/// 解析一行输入：数字为选项序号，n 下一题，s 交卷，q 放弃
pub fn parse_command(line: &str) -> Option<AttemptCommand> {
    let input = line.trim().to_lowercase();
    match input.as_str() {
        "n" | "next" => Some(AttemptCommand::Advance),
        "s" | "submit" => Some(AttemptCommand::Submit),
        "q" | "quit" => Some(AttemptCommand::Quit),
        other => other.parse().ok().map(AttemptCommand::SelectOption),
    }
}

/// 把从 `from` 开始的参数拼成一段文本，没有参数时返回 None
fn rest_text(args: &[String], from: usize) -> Option<String> {
    let text = args.get(from..)?.join(" ");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_flag(arg: Option<&str>) -> Result<bool> {
    match arg.map(|a| a.trim().to_lowercase()).as_deref() {
        Some("true" | "yes" | "y" | "1") => Ok(true),
        Some("false" | "no" | "n" | "0") => Ok(false),
        Some(other) => bail!("无法识别的正确标记: {}（应为 true / false）", other),
        None => bail!("缺少正确标记（true / false）"),
    }
}

fn parse_id(arg: Option<&str>) -> Result<i64> {
    let Some(raw) = arg else {
        println!("{}", USAGE);
        bail!("缺少 ID");
    };
    raw.parse()
        .with_context(|| format!("ID 必须是整数: {}", raw))
}
