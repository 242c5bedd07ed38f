//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{auth, handlers, middleware::AppState};

/// 创建应用路由
///
/// 同一路径的读写方法由同一个 MethodRouter 承载，访问守卫通过
/// `route_layer` 只挂在需要认证的方法上。
pub fn create_router(state: Arc<AppState>) -> Router {
    let require_auth =
        axum::middleware::from_fn_with_state(state.clone(), auth::middleware::auth_guard);

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需令牌）
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/token", post(handlers::auth::token));

    // 用户自助资料管理，全部需要认证
    let user_routes = Router::new()
        .route(
            "/api/v1/users/me",
            get(handlers::user::get_me)
                .put(handlers::user::update_me)
                .delete(handlers::user::delete_me),
        )
        .layer(require_auth.clone());

    // 图书目录：读操作公开，写操作需要认证（staff 检查在处理器内）
    let book_routes = Router::new()
        .route(
            "/api/v1/books",
            get(handlers::book::list_books)
                .merge(post(handlers::book::create_book).route_layer(require_auth.clone())),
        )
        .route(
            "/api/v1/books/{id}",
            get(handlers::book::get_book).merge(
                put(handlers::book::update_book)
                    .delete(handlers::book::delete_book)
                    .route_layer(require_auth),
            ),
        )
        .route(
            "/api/v1/books/isbn/{isbn}",
            get(handlers::book::get_book_by_isbn),
        );

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(user_routes)
        .merge(book_routes)
        .layer(axum::middleware::from_fn(
            crate::middleware::request_tracking_middleware,
        ))
        .layer(tower_http::compression::CompressionLayer::new())
        // 请求体上限 1 MiB，封面图走外部 URL 而不是内联上传
        .layer(tower_http::limit::RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}
