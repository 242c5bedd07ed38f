//! 图书目录的 HTTP 处理器
//! 读操作公开；写操作需要 staff 角色

use crate::{
    auth::middleware::{require_role, CurrentUser},
    error::AppError,
    middleware::AppState,
    models::{book::*, user::Role},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 分页参数
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// 列出图书
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);

    let books = state.book_service.list_books(limit, offset).await?;
    let count = books.len();

    Ok(Json(json!({
        "books": books,
        "count": count
    })))
}

/// 获取图书详情
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let book = state.book_service.get_book(id).await?;

    Ok(Json(book))
}

/// 根据 ISBN 查找图书
pub async fn get_book_by_isbn(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let book = state.book_service.find_by_isbn(&isbn).await?;

    Ok(Json(book))
}

/// 创建图书（staff）
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, Role::Staff)?;
    req.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let book = state.book_service.create_book(&req).await?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// 更新图书（staff）
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, Role::Staff)?;

    let book = state.book_service.update_book(id, &patch).await?;

    Ok(Json(book))
}

/// 删除图书（staff）
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, Role::Staff)?;

    let deleted = state.book_service.delete_book(id).await?;

    Ok(Json(json!({ "deleted": deleted })))
}
