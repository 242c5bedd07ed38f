//! 认证服务：注册、登录、身份解析、资料维护
//!
//! 所有失败对调用方都是终态，服务内部不做重试。明文口令只在单次请求
//! 的生命周期内存在，绝不落库、绝不写日志。

use crate::{
    auth::jwt::TokenCodec,
    auth::password::PasswordHasher,
    error::AppError,
    models::{auth::TokenResponse, user::*},
    repository::UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    db: PgPool,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(db: PgPool, codec: Arc<TokenCodec>) -> Self {
        Self { db, codec }
    }

    /// 用户注册
    ///
    /// 唯一性检查顺序固定：先用户名后邮箱，只报告最先发现的冲突。
    /// 这里的检查只是快速路径；并发注册下以存储层唯一约束为准，
    /// 插入冲突同样映射为对应的 Duplicate 错误。
    pub async fn register(&self, req: &RegisterRequest) -> Result<User, AppError> {
        let repo = UserRepository::new(self.db.clone());

        if repo.find_by_username(&req.username).await?.is_some() {
            tracing::debug!(username = %req.username, "Registration rejected: username taken");
            return Err(AppError::DuplicateUsername);
        }

        if repo.find_by_email(&req.email).await?.is_some() {
            tracing::debug!(email = %req.email, "Registration rejected: email taken");
            return Err(AppError::DuplicateEmail);
        }

        let hasher = PasswordHasher::new();
        let password_hash = hasher.hash(&req.password)?;

        // 单一提交点：角色默认 patron、is_active 默认 true 由存储层赋值
        let user = repo.insert(&req.username, &req.email, &password_hash).await?;

        tracing::info!(username = %user.username, user_id = %user.id, "User registered");

        Ok(user)
    }

    /// 用户登录，成功时签发角色快照令牌
    ///
    /// `UserNotFound` 与 `InvalidCredentials` 在内部是两种错误（便于日志
    /// 排查），但对外由错误层映射为同一条消息。
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let repo = UserRepository::new(self.db.clone());

        let user = repo.find_by_username(username).await?.ok_or_else(|| {
            tracing::debug!(%username, "Login failed: unknown username");
            AppError::UserNotFound
        })?;

        let hasher = PasswordHasher::new();
        if !hasher.verify(password, &user.password_hash) {
            tracing::debug!(%username, "Login failed: password verification failed");
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.codec.issue(&user.username, user.role())?;

        tracing::info!(%username, "Login succeeded");

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.codec.token_ttl_secs(),
        })
    }

    /// 从令牌解析当前用户
    ///
    /// 令牌内嵌的角色必须与当前记录一致：角色在签发后发生变更的令牌
    /// 一律拒绝（`RoleMismatch`），不做静默升降级。
    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        let claims = self.codec.decode(token)?;

        let repo = UserRepository::new(self.db.clone());
        let user = repo.find_by_username(&claims.sub).await?.ok_or_else(|| {
            tracing::debug!(subject = %claims.sub, "Token subject no longer exists");
            AppError::UserNotFound
        })?;

        if user.role != claims.role {
            tracing::warn!(
                username = %user.username,
                token_role = %claims.role,
                current_role = %user.role,
                "Rejected token with stale role"
            );
            return Err(AppError::RoleMismatch);
        }

        Ok(user)
    }

    /// 更新用户资料（补丁语义，由存储层原子生效）
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let repo = UserRepository::new(self.db.clone());

        // 口令变更：先哈希再入库，明文不传递到存储层
        let password_hash = match &patch.password {
            Some(password) => Some(PasswordHasher::new().hash(password)?),
            None => None,
        };

        let user = repo
            .update(user_id, patch, password_hash.as_deref())
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!(user_id = %user.id, "User profile updated");

        Ok(user)
    }

    /// 删除用户
    pub async fn delete(&self, user_id: Uuid) -> Result<bool, AppError> {
        let repo = UserRepository::new(self.db.clone());

        let deleted = repo.delete(user_id).await?;
        if !deleted {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(%user_id, "User deleted");

        Ok(true)
    }
}
