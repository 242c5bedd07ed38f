//! HTTP API 集成测试
//!
//! 通过 tower::ServiceExt::oneshot 直接驱动路由，不启动真实监听。
//! 需要数据库的测试标记为 #[ignore]。

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use library_system::routes;
use serde_json::{json, Value};
use serial_test::serial;
use tower::ServiceExt;

async fn create_test_app() -> Router {
    let config = common::create_test_config();
    let pool = common::setup_test_db(&config).await;
    let state = common::create_test_app_state(pool).await;
    routes::create_router(state)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body(username: &str, email: &str) -> Body {
    Body::from(
        json!({
            "username": username,
            "email": email,
            "password": "pw123"
        })
        .to_string(),
    )
}

async fn register(app: &Router, username: &str, email: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(register_body(username, email))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("username={}&password={}", username, password)))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn bearer_token(app: &Router, username: &str, password: &str) -> String {
    let response = login(app, username, password).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
#[serial]
#[ignore] // 需要数据库连接
async fn test_register_login_me_flow() {
    let app = create_test_app().await;

    // 注册
    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "patron");
    // 响应不得泄露口令哈希
    assert!(body.get("password_hash").is_none());

    // 登录换取令牌
    let response = login(&app, "alice", "pw123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    // 持令牌访问 /users/me
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
#[serial]
#[ignore] // 需要数据库连接
async fn test_login_failures_indistinguishable_over_http() {
    let app = create_test_app().await;

    register(&app, "bob", "bob@example.com").await;

    // 密码错误与用户不存在返回完全相同的状态码和消息
    let response = login(&app, "bob", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body1 = json_body(response).await;

    let response = login(&app, "nobody", "pw123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body2 = json_body(response).await;

    assert_eq!(body1["error"]["message"], "Incorrect username or password");
    assert_eq!(body1["error"]["message"], body2["error"]["message"]);
}

#[tokio::test]
#[serial]
#[ignore] // 需要数据库连接
async fn test_duplicate_registration_conflicts() {
    let app = create_test_app().await;

    assert_eq!(
        register(&app, "carol", "carol@example.com").await.status(),
        StatusCode::CREATED
    );

    // 用户名冲突优先于邮箱冲突
    let response = register(&app, "carol", "carol@example.com").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Username already exists");

    let response = register(&app, "carol2", "carol@example.com").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Email already exists");
}

#[tokio::test]
#[serial]
#[ignore] // 需要数据库连接
async fn test_protected_route_rejects_missing_or_garbage_token() {
    let app = create_test_app().await;

    // 无令牌
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/users/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 垃圾令牌
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Invalid authentication credentials");
}

#[tokio::test]
#[serial]
#[ignore] // 需要数据库连接
async fn test_deactivated_account_rejected_with_valid_token() {
    let config = common::create_test_config();
    let pool = common::setup_test_db(&config).await;
    let state = common::create_test_app_state(pool.clone()).await;
    let app = routes::create_router(state);

    register(&app, "dave", "dave@example.com").await;
    let token = bearer_token(&app, "dave", "pw123").await;

    common::deactivate_user(&pool, "dave").await.unwrap();

    // 令牌本身仍然有效，但停用账户一律拒绝
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Inactive user");
}

#[tokio::test]
#[serial]
#[ignore] // 需要数据库连接
async fn test_book_mutations_require_staff_role() {
    let config = common::create_test_config();
    let pool = common::setup_test_db(&config).await;
    let state = common::create_test_app_state(pool.clone()).await;
    let app = routes::create_router(state);

    let book_payload = json!({
        "title": "The Rust Programming Language",
        "author": "Steve Klabnik",
        "isbn": "9781718500440"
    })
    .to_string();

    // 目录读操作公开
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/books").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // patron 不能创建图书
    register(&app, "erin", "erin@example.com").await;
    let patron_token = bearer_token(&app, "erin", "pw123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/books")
                .header(header::AUTHORIZATION, format!("Bearer {}", patron_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(book_payload.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // staff 可以创建图书（角色变更后重新登录获取新角色令牌）
    common::set_user_role(&pool, "erin", "staff").await.unwrap();
    let staff_token = bearer_token(&app, "erin", "pw123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/books")
                .header(header::AUTHORIZATION, format!("Bearer {}", staff_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(book_payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["isbn"], "9781718500440");

    // 角色变更后旧令牌被拒绝
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", patron_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_endpoint_no_database_required() {
    // /health 不依赖数据库，用不触发连接的延迟连接池即可构造应用
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgresql://invalid-host/none")
        .unwrap();
    let state = common::create_test_app_state(pool).await;
    let app = routes::create_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
