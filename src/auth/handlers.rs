use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, PasswordResetConfirm, PasswordResetRequest,
            RefreshRequest, RegisterRequest, SessionUser,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::{self, User},
    },
    error::AppError,
    state::AppState,
};

const DEFAULT_ROLE: &str = "staff";
const MIN_PASSWORD_LEN: usize = 8;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/password-reset/request", post(request_password_reset))
        .route("/auth/password-reset/confirm", post(confirm_password_reset))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation("password too short".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("invalid email".into()));
    }
    validate_password(&payload.password)?;

    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("email already registered"));
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::Internal(e)
    })?;

    let user = User::create(&state.db, &payload.email, &hash)
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            AppError::Internal(e)
        })?;

    repo::assign_role(&state.db, user.id, DEFAULT_ROLE)
        .await
        .map_err(|e| {
            error!(error = %e, "assign role failed");
            AppError::Internal(e)
        })?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id).map_err(AppError::Internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(AppError::Internal)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: SessionUser {
            id: user.id,
            email: user.email,
            role: Some(DEFAULT_ROLE.into()),
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::Unauthorized("invalid credentials"));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(AppError::Internal(e));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        AppError::Internal(e)
    })?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("invalid credentials"));
    }

    let role = repo::find_role(&state.db, user.id)
        .await
        .map_err(AppError::Internal)?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id).map_err(AppError::Internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(AppError::Internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: SessionUser {
            id: user.id,
            email: user.email,
            role,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized("invalid refresh token")
    })?;

    let access_token = keys.sign_access(claims.sub).map_err(AppError::Internal)?;
    let refresh_token = keys.sign_refresh(claims.sub).map_err(AppError::Internal)?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::Unauthorized("user not found"))?;
    let role = repo::find_role(&state.db, user.id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: SessionUser {
            id: user.id,
            email: user.email,
            role,
        },
    }))
}

/// Tokens are stateless; sign-out is an acknowledgement that the client
/// discards its pair.
#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> StatusCode {
    info!(user_id = %user_id, "user logged out");
    StatusCode::NO_CONTENT
}

/// Always answers 202 so the endpoint does not reveal which emails exist.
/// No mailer is wired up; the reset token surfaces in the log for operators.
#[instrument(skip(state, payload))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(mut payload): Json<PasswordResetRequest>,
) -> Result<StatusCode, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("invalid email".into()));
    }

    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(user)) => {
            let keys = JwtKeys::from_ref(&state);
            let token = keys.sign_reset(user.id).map_err(AppError::Internal)?;
            info!(user_id = %user.id, "password reset token issued");
            debug!(token = %token, "reset token");
        }
        Ok(None) => {
            warn!(email = %payload.email, "reset requested for unknown email");
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(AppError::Internal(e));
        }
    }

    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state, payload))]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirm>,
) -> Result<StatusCode, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_reset(&payload.token).map_err(|e| {
        warn!(error = %e, "reset token rejected");
        AppError::Unauthorized("invalid reset token")
    })?;

    validate_password(&payload.new_password)?;

    let hash = hash_password(&payload.new_password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::Internal(e)
    })?;
    User::update_password(&state.db, claims.sub, &hash)
        .await
        .map_err(AppError::Internal)?;

    info!(user_id = %claims.sub, "password reset completed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SessionUser>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "user lookup failed");
            AppError::Internal(e)
        })?
        .ok_or(AppError::Unauthorized("user not found"))?;

    let role = repo::find_role(&state.db, user.id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(SessionUser {
        id: user.id,
        email: user.email,
        role,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("owner@bar.example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@at@signs.example"));
    }

    #[test]
    fn session_user_serialization() {
        let response = SessionUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            role: Some("admin".into()),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("admin"));
    }
}
