//! 用户自助管理的 HTTP 处理器
//!
//! 只开放 /users/me：调用方经访问守卫解析出的身份即是操作目标，
//! 不提供跨用户操作入口。

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::user::*,
};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// 获取当前用户信息
pub async fn get_me(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserResponse::from(user)))
}

/// 更新当前用户资料
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.auth_service.update_profile(user.id, &patch).await?;

    Ok(Json(UserResponse::from(updated)))
}

/// 删除当前用户账户
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.auth_service.delete(user.id).await?;

    Ok(Json(json!({ "deleted": deleted })))
}
