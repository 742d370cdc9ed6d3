/// 日志工具模块
///
/// 提供答题过程中的格式化输出
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::QuizStatistics;
use crate::services::{Notification, NotificationKind};
use crate::workflow::{AttemptReport, AttemptView};

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验客户端");
    info!("🌐 后端地址: {}", config.api_base_url);
    info!("⏱️ 答题限时: {} 秒", config.quiz_duration_secs);
    info!("{}", "=".repeat(60));
}

/// 打印当前题目
pub fn render_question(view: &AttemptView<'_>) {
    println!("\n{}", "─".repeat(60));
    println!(
        "第 {}/{} 题    ⏱️ 剩余 {}",
        view.position, view.total, view.remaining
    );
    println!("{}", view.question.question_text);
    for (i, answer) in view.question.answers.iter().enumerate() {
        let mark = if view.selected_answer == Some(answer.answer_id) {
            "●"
        } else {
            "○"
        };
        println!("  {} {}. {}", mark, i + 1, answer.answer_text);
    }
    if view.position < view.total {
        println!("输入选项序号作答，n 下一题，s 交卷，q 放弃");
    } else {
        println!("输入选项序号作答，s 交卷，q 放弃");
    }
}

/// 打印答题结果
pub fn print_attempt_summary(quiz_id: i64, report: &AttemptReport) {
    info!("\n{}", "=".repeat(60));
    info!("🎉 测验 {} 结果", quiz_id);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));

    match (&report.summary, &report.submit_error) {
        (Some(summary), _) => {
            info!("✅ 正确: {}", summary.correct);
            info!("❌ 错误: {}", summary.wrong);
            info!("📊 总题数: {}", summary.total);
            info!("得分: {} / {}", summary.correct, summary.total);
        }
        (None, Some(error)) => warn!("⚠️ 成绩提交失败: {}", error),
        (None, None) => warn!("⚠️ 未交卷，没有成绩"),
    }
    info!("{}", "=".repeat(60));
}

/// 打印一条通知
pub fn print_notification(notification: &Notification) {
    match notification.kind {
        NotificationKind::Info => info!("💬 {}", notification.message),
        NotificationKind::Success => info!("✅ {}", notification.message),
        NotificationKind::Warning => warn!("⚠️ {}", notification.message),
        NotificationKind::Error => error!("❌ {}", notification.message),
    }
}

/// 打印测验统计
pub fn print_statistics(stats: &QuizStatistics) {
    info!("📈 测验统计");
    info!(
        "平均分: {:.2}{}",
        stats.average_score,
        percentage_suffix(stats.average_percentage, stats.total_questions)
    );
    info!(
        "最高分: {}{}",
        stats.best_score,
        percentage_suffix(stats.best_percentage, stats.total_questions)
    );
    info!("作答人次: {}", stats.total_attempts);
}

fn percentage_suffix(percentage: Option<f64>, total_questions: i64) -> String {
    match percentage {
        Some(p) if total_questions > 0 => format!(" ({}% / 共 {} 题)", p, total_questions),
        _ => String::new(),
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("这是一段很长的题干内容", 4), "这是一段...");
    }

    #[test]
    fn test_percentage_suffix() {
        assert_eq!(percentage_suffix(Some(50.0), 4), " (50% / 共 4 题)");
        assert_eq!(percentage_suffix(None, 4), "");
        assert_eq!(percentage_suffix(Some(50.0), 0), "");
    }
}
