//! Auth API Handlers
//!
//! 登录颁发 JWT 访问令牌 + 不透明刷新令牌 (缓存 7 天)；登出把访问
//! 令牌按剩余有效期放进黑名单。

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::Argon2;
use axum::{Extension, Json, extract::State};
use serde::Serialize;
use validator::Validate;

use crate::auth::{BearerToken, CurrentUser, generate_refresh_token, permissions};
use crate::core::ServerState;
use crate::db::models::{LoginRequest, RefreshRequest, UserProfile};
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// 登录/刷新响应
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub refresh_token: String,
    /// 访问令牌有效期 (秒)
    pub expires_in: i64,
    pub user: UserProfile,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    req.validate()?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_email(&req.email)
        .await?
        .filter(|u| u.is_active())
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        security_log!("WARN", "login_failed", email = req.email.clone());
        return Err(AppError::InvalidCredentials);
    }

    let response = issue_tokens(&state, &user).await?;
    security_log!(
        "INFO",
        "login_success",
        user_id = user.id.clone(),
        email = user.email.clone()
    );
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// 刷新令牌一次一换：校验通过后旧令牌作废，颁发新的一对。
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    req.validate()?;

    let cache_key = format!("refresh_token:{}", req.user_id);
    let stored = state
        .cache
        .get(&cache_key)
        .await
        .ok_or(AppError::InvalidRefreshToken)?;
    if stored != req.refresh_token {
        security_log!("WARN", "refresh_token_mismatch", user_id = req.user_id.clone());
        return Err(AppError::InvalidRefreshToken);
    }

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(&req.user_id)
        .await?
        .filter(|u| u.is_active())
        .ok_or(AppError::InvalidRefreshToken)?;

    let response = issue_tokens(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// 访问令牌进黑名单直到自然过期，刷新令牌直接删除。
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> AppResult<Json<serde_json::Value>> {
    if let Ok(claims) = state.jwt_service.validate_token(&token) {
        let remaining = state.jwt_service.get_expiration_seconds(&claims);
        if remaining > 0 {
            state
                .cache
                .set(format!("blacklist:{token}"), "1", remaining as u64)
                .await;
        }
    }
    state
        .cache
        .delete(&format!("refresh_token:{}", user.id))
        .await;

    security_log!("INFO", "logout", user_id = user.id.clone());
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserProfile>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(UserProfile::from_user(
        &user,
        permissions::default_permissions(&user.role),
    )))
}

async fn issue_tokens(
    state: &ServerState,
    user: &crate::db::models::User,
) -> AppResult<TokenResponse> {
    let perms = permissions::default_permissions(&user.role);
    let token = state
        .jwt_service
        .generate_token(&user.id, &user.organization_id, &user.email, &user.role, &perms)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    let refresh_token = generate_refresh_token();
    state
        .cache
        .set(
            format!("refresh_token:{}", user.id),
            refresh_token.clone(),
            state.jwt_service.config.refresh_expiration_secs,
        )
        .await;

    Ok(TokenResponse {
        token,
        refresh_token,
        expires_in: state.jwt_service.config.expiration_minutes * 60,
        user: UserProfile::from_user(user, perms),
    })
}

/// Argon2id 哈希 (建号和测试夹具用)。
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("hunter2!").expect("hashing failed");
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
    }

    #[test]
    fn test_garbage_hash_rejected() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
