//! 访问守卫中间件
//!
//! 每个受保护请求独立执行：提取 Bearer 令牌 → Auth Service 解析身份 →
//! 校验账户激活状态。请求之间不保留任何会话状态。

use crate::{error::AppError, middleware::AppState, models::user::{Role, User}};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 已授权主体（附加到请求扩展）
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

// 实现 FromRequestParts 以便在 handler 中直接提取 CurrentUser
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::TokenMalformed)
    }
}

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .ok_or(AppError::TokenMalformed)
}

/// 访问守卫 - 必须认证且账户处于激活状态
pub async fn auth_guard(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    // 解析身份（令牌解码 + 用户查询 + 角色漂移检查）
    let user = state.auth_service.resolve(&token).await?;

    // 停用账户拒绝访问，即使令牌本身有效
    if !user.is_active {
        tracing::debug!(username = %user.username, "Rejected token for inactive account");
        return Err(AppError::InactiveAccount);
    }

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// 角色检查：当前用户必须持有给定角色
pub fn require_role(user: &User, role: Role) -> Result<(), AppError> {
    if user.role() != role {
        tracing::debug!(
            username = %user.username,
            have = %user.role,
            want = %role,
            "Insufficient role"
        );
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_valid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        let token = extract_token(&headers).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn test_extract_token_invalid_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn test_require_role() {
        let staff = User {
            id: uuid::Uuid::new_v4(),
            username: "bob".to_string(),
            email: "bob@x.com".to_string(),
            password_hash: String::new(),
            role: "staff".to_string(),
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        assert!(require_role(&staff, Role::Staff).is_ok());
        assert!(matches!(require_role(&staff, Role::Patron), Err(AppError::Forbidden)));
    }
}
