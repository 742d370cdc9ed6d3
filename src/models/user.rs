use serde::{Deserialize, Serialize};

/// 已登录用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
}

/// JWT 载荷中客户端关心的字段
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// 邮箱
    pub sub: String,
    pub user_id: i64,
}

/// 登录响应
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// 注册请求（后端字段名沿用 hashed_password，传的是明文）
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub user_email: String,
    pub hashed_password: String,
}
