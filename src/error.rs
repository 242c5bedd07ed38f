//! 统一错误模型
//! 定义所有错误类型和错误响应格式
//!
//! 登录阶段的 `UserNotFound` 与 `InvalidCredentials` 对外映射为同一条
//! 消息，防止用户名枚举；`TokenExpired` 与 `TokenMalformed` 同理。
//! 内部保留区分，仅用于日志。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is malformed or its signature does not verify")]
    TokenMalformed,

    #[error("Token role does not match the role on record")]
    RoleMismatch,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Access denied")]
    Forbidden,

    #[error("Book not found")]
    BookNotFound,

    #[error("Invalid ISBN: {0}")]
    InvalidIsbn(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername
            | AppError::DuplicateEmail
            | AppError::InvalidIsbn(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound
            | AppError::InvalidCredentials
            | AppError::TokenExpired
            | AppError::TokenMalformed => StatusCode::UNAUTHORIZED,
            AppError::RoleMismatch | AppError::InactiveAccount | AppError::Forbidden => {
                StatusCode::FORBIDDEN
            }
            AppError::BookNotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::DuplicateUsername => "Username already exists".to_string(),
            AppError::DuplicateEmail => "Email already exists".to_string(),
            // 登录失败：不区分"用户不存在"和"密码错误"
            AppError::UserNotFound | AppError::InvalidCredentials => {
                "Incorrect username or password".to_string()
            }
            // 令牌失败：不区分"过期"和"格式/签名错误"
            AppError::TokenExpired | AppError::TokenMalformed => {
                "Invalid authentication credentials".to_string()
            }
            AppError::RoleMismatch | AppError::Forbidden => "Access denied".to_string(),
            AppError::InactiveAccount => "Inactive user".to_string(),
            AppError::BookNotFound => "Book not found".to_string(),
            AppError::InvalidIsbn(_) => "Invalid ISBN format".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Storage(_) => "Storage temporarily unavailable".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 内部日志保留完整错误种类，对外响应只含通用消息
        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                kind = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::debug!(
                code = self.code(),
                kind = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}
