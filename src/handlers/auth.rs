//! 认证相关的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::{auth::LoginRequest, user::*},
};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// 注册新用户
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state.auth_service.register(&req).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 登录换取访问令牌（表单提交，OAuth2 password flow 风格）
pub async fn token(
    State(state): State<Arc<AppState>>,
    Form(req): Form<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.login(&req.username, &req.password).await?;

    Ok(Json(response))
}
