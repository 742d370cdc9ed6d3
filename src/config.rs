use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 REST API 地址
    pub api_base_url: String,
    /// 每次答题的倒计时（秒）
    pub quiz_duration_secs: u64,
    /// 登录状态保存位置
    pub session_file: String,
    /// 通知默认显示时长（毫秒）
    pub notification_duration_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 非交互登录（可选） ---
    pub login_email: Option<String>,
    pub login_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            quiz_duration_secs: 300,
            session_file: "session.toml".to_string(),
            notification_duration_ms: 3000,
            verbose_logging: false,
            login_email: None,
            login_password: None,
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_env_with(Self::default())
    }

    /// 在给定配置基础上应用环境变量覆盖，结果同样经过校验
    pub fn from_env_with(base: Config) -> AppResult<Self> {
        Self::with_overrides(base, |key| std::env::var(key).ok())
    }

    /// 用 `lookup` 查到的值覆盖 `base`；数字、布尔值解析失败时保留原值
    fn with_overrides(base: Config, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        fn parsed<T: std::str::FromStr>(value: Option<String>, fallback: T) -> T {
            value.and_then(|v| v.trim().parse().ok()).unwrap_or(fallback)
        }

        let config = Self {
            api_base_url: lookup("QUIZ_API_URL").unwrap_or(base.api_base_url),
            quiz_duration_secs: parsed(lookup("QUIZ_DURATION_SECS"), base.quiz_duration_secs),
            session_file: lookup("QUIZ_SESSION_FILE").unwrap_or(base.session_file),
            notification_duration_ms: parsed(
                lookup("NOTIFICATION_DURATION_MS"),
                base.notification_duration_ms,
            ),
            verbose_logging: parsed(lookup("VERBOSE_LOGGING"), base.verbose_logging),
            login_email: lookup("QUIZ_EMAIL").or(base.login_email),
            login_password: lookup("QUIZ_PASSWORD").or(base.login_password),
        };

        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(display.clone(), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: display,
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.quiz_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "quiz_duration_secs 必须大于 0".to_string(),
            }
            .into());
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "api_base_url 不能为空".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.quiz_duration_secs, 300);
        assert_eq!(config.notification_duration_ms, 3000);
        assert_eq!(config.api_base_url, "http://localhost:8000");
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"http://quiz.local\"\nquiz_duration_secs = 120").unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.api_base_url, "http://quiz.local");
        assert_eq!(config.quiz_duration_secs, 120);
        assert_eq!(config.session_file, "session.toml");
    }

    #[test]
    fn test_env_overrides_applied_and_validated() {
        fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
            move |key: &str| {
                pairs
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string())
            }
        }

        let config = Config::with_overrides(
            Config::default(),
            vars(&[("QUIZ_DURATION_SECS", "90"), ("VERBOSE_LOGGING", "yes")]),
        )
        .unwrap();
        assert_eq!(config.quiz_duration_secs, 90);
        assert!(!config.verbose_logging);

        let err = Config::with_overrides(Config::default(), vars(&[("QUIZ_DURATION_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_toml_zero_duration_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quiz_duration_secs = 0").unwrap();

        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid { .. })));
    }
}
