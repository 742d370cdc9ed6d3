use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 答题流程错误
    #[error("答题错误: {0}")]
    Attempt(#[from] AttemptError),
    /// 登录状态错误
    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输入校验失败（出卷前的本地检查）
    #[error("校验失败: {0}")]
    Validation(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回非 2xx 响应
    #[error("API返回错误响应 ({endpoint}): status={status}, detail={detail:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 答题流程错误，只作用于单次答题
#[derive(Debug, Error)]
pub enum AttemptError {
    /// 题目加载失败（界面上显示为"暂无题目"）
    #[error("测验 {quiz_id} 的题目加载失败: {reason}")]
    Load { quiz_id: i64, reason: String },
    /// 成绩提交失败，答题仍视为已结束
    #[error("测验 {quiz_id} 的成绩提交失败: {source}")]
    Submit {
        quiz_id: i64,
        #[source]
        source: Box<AppError>,
    },
    /// 答题已结束，不再接受修改
    #[error("测验 {quiz_id} 已交卷，不能再修改")]
    Finalized { quiz_id: i64 },
}

/// 登录状态错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// token 无法解析
    #[error("无效的 token: {reason}")]
    InvalidToken { reason: String },
    /// 需要登录的操作
    #[error("尚未登录")]
    NotAuthenticated,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败 ({path}): {source}")]
    TomlSerializeFailed {
        path: String,
        #[source]
        source: toml::ser::Error,
    },
    /// 不是 PDF 文件
    #[error("不是有效的 PDF 文件: {path}")]
    NotPdf { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件不合法
    #[error("配置文件不合法: {reason}")]
    Invalid { reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建非 2xx 响应错误
    pub fn bad_response(endpoint: impl Into<String>, status: u16, detail: Option<String>) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            detail,
        })
    }

    /// 创建题目加载错误
    pub fn load_failed(quiz_id: i64, reason: impl Into<String>) -> Self {
        AppError::Attempt(AttemptError::Load {
            quiz_id,
            reason: reason.into(),
        })
    }

    /// 创建成绩提交错误
    pub fn submit_failed(quiz_id: i64, source: AppError) -> Self {
        AppError::Attempt(AttemptError::Submit {
            quiz_id,
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为题目加载失败
    pub fn is_load_error(&self) -> bool {
        matches!(self, AppError::Attempt(AttemptError::Load { .. }))
    }

    /// 是否为成绩提交失败
    pub fn is_submit_error(&self) -> bool {
        matches!(self, AppError::Attempt(AttemptError::Submit { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
