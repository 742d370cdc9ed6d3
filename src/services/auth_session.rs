//! 登录状态 - 业务能力层
//!
//! 显式持有"当前是谁在用"，由调用方传给需要它的组件，
//! 不做全局单例。token 以 TOML 形式保存在本地，下次启动时恢复。

use crate::error::{AppError, AppResult, AuthError, FileError};
use crate::models::{TokenClaims, UserIdentity};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 保存到磁盘的登录信息
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// 登录状态
#[derive(Debug, Default)]
pub struct AuthSession {
    token: Option<String>,
    user: Option<UserIdentity>,
    session_file: Option<PathBuf>,
}

impl AuthSession {
    /// 不落盘的空会话
    pub fn new() -> Self {
        Self::default()
    }

    /// 从会话文件恢复；文件不存在时返回空会话，文件损坏时删除并返回空会话
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut session = Self {
            session_file: Some(path.clone()),
            ..Self::default()
        };

        if !path.exists() {
            debug!("会话文件不存在: {}", path.display());
            return session;
        }

        match read_stored_token(&path).and_then(|token| decode_token(&token).map(|u| (token, u))) {
            Ok((token, user)) => {
                info!("✓ 已恢复登录状态: {}", user.email);
                session.token = Some(token);
                session.user = Some(user);
            }
            Err(e) => {
                warn!("⚠️ 会话文件无效，已丢弃: {}", e);
                if let Err(e) = fs::remove_file(&path) {
                    warn!("删除会话文件失败 {}: {}", path.display(), e);
                }
            }
        }

        session
    }

    /// 用新 token 登录；token 无法解析或保存失败时保持原状态
    pub fn login(&mut self, token: impl Into<String>) -> AppResult<&UserIdentity> {
        let token = token.into();
        let user = decode_token(&token)?;

        if let Some(path) = &self.session_file {
            write_stored_token(path, &token)?;
        }

        info!("✓ 登录成功: {} (ID: {})", user.email, user.id);
        self.token = Some(token);
        Ok(self.user.insert(user))
    }

    /// 退出登录并删除会话文件
    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;

        if let Some(path) = &self.session_file {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    warn!("删除会话文件失败 {}: {}", path.display(), e);
                }
            }
        }
        info!("已退出登录");
    }

    /// 持久化当前 token；空会话或未配置文件时什么都不做
    pub fn save(&self) -> AppResult<()> {
        match (&self.session_file, &self.token) {
            (Some(path), Some(token)) => write_stored_token(path, token),
            _ => Ok(()),
        }
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// 需要登录的操作使用
    pub fn require_user(&self) -> AppResult<&UserIdentity> {
        self.user.as_ref().ok_or(AppError::Auth(AuthError::NotAuthenticated))
    }
}

fn write_stored_token(path: &Path, token: &str) -> AppResult<()> {
    let stored = StoredSession {
        token: token.to_string(),
    };
    let content = toml::to_string(&stored).map_err(|e| FileError::TomlSerializeFailed {
        path: path.display().to_string(),
        source: e,
    })?;

    fs::write(path, content).map_err(|e| FileError::WriteFailed {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

fn read_stored_token(path: &Path) -> AppResult<String> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    let stored: StoredSession = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(stored.token)
}

/// 注册前的本地检查：邮箱格式，密码至少 8 位且包含大小写字母和数字
pub fn validate_registration(email: &str, password: &str) -> AppResult<()> {
    let email = email.trim();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid_email {
        return Err(AppError::Validation(format!("邮箱格式不正确: {}", email)));
    }

    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit());
    if !strong {
        return Err(AppError::Validation(
            "密码至少 8 位，且需包含大写字母、小写字母和数字".to_string(),
        ));
    }
    Ok(())
}

/// 解析 JWT 载荷（不校验签名，签名由后端负责）
pub fn decode_token(token: &str) -> AppResult<UserIdentity> {
    let invalid = |reason: &str| AppError::Auth(AuthError::InvalidToken {
        reason: reason.to_string(),
    });

    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(invalid("token 不是三段式 JWT")),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| invalid(&format!("载荷 base64 解码失败: {}", e)))?;

    let claims: TokenClaims = serde_json::from_slice(&bytes)
        .map_err(|e| invalid(&format!("载荷 JSON 解析失败: {}", e)))?;

    Ok(UserIdentity {
        id: claims.user_id,
        email: claims.sub,
    })
}
