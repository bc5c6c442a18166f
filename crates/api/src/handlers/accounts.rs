//! Handlers for the `/accounts` resource: registration, login, token
//! refresh, logout, profile, and password change.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskfund_core::accounts::{
    normalize_email, validate_email, validate_name, validate_phone_number, Gender,
};
use taskfund_core::error::CoreError;
use taskfund_core::types::DbId;
use taskfund_db::models::session::CreateSession;
use taskfund_db::models::user::{CreateUser, UpdateProfile, User, UserProfile};
use taskfund_db::repositories::{SessionRepo, UserRepo};
use validator::Validate;

use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, hash_refresh_token, role_for,
};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult, EMAIL_TAKEN, PHONE_TAKEN};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, DetailResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /accounts/register`. Names are trimmed before
/// they are validated and stored.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub gender: Gender,
    pub image: Option<String>,
    pub password: String,
}

/// Request body for `POST /accounts/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

/// Request body for `POST /accounts/login/refresh-token`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /accounts/logout`. Without a token every session
/// of the caller is revoked.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Request body for `POST /accounts/change-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    pub new_password: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserProfile,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/accounts/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserProfile>>)> {
    validate_name("first_name", &input.first_name)?;
    validate_name("last_name", &input.last_name)?;
    validate_phone_number(&input.phone_number)?;
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_password_strength(&input.password, state.config.password_min_length)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    ensure_unique(&state, &email, &input.phone_number).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            phone_number: input.phone_number,
            email,
            gender: input.gender,
            image: input.image,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

/// POST /api/v1/accounts/login
///
/// Authenticate with phone number + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid phone number or password".into(),
        ))
    };

    let user = UserRepo::find_by_phone_number(&state.pool, &input.phone_number)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(create_auth_response(&state, user).await?))
}

/// POST /api/v1/accounts/login/refresh-token
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Rotation: the presented token is single-use. Losing the revoke race
    // means another request already rotated it.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        tracing::warn!(user_id = session.user_id, session_id = session.id, "Refresh token reused");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    Ok(Json(create_auth_response(&state, user).await?))
}

/// POST /api/v1/accounts/logout
pub async fn logout(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Option<Json<LogoutRequest>>,
) -> AppResult<Json<DetailResponse>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();

    match input.refresh_token {
        Some(token) => {
            let hash = hash_refresh_token(&token);
            let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &hash)
                .await?
                .filter(|s| s.user_id == auth.user_id)
                .ok_or_else(|| {
                    AppError::BadRequest("Invalid or expired refresh token".into())
                })?;
            SessionRepo::revoke(&state.pool, session.id).await?;
        }
        None => {
            SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
        }
    }

    tracing::info!(user_id = auth.user_id, "User logged out");
    Ok(Json(DetailResponse {
        detail: "User Logged out successfully",
    }))
}

/// GET /api/v1/accounts/profile
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let user = find_user(&state, auth.user_id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT|PATCH /api/v1/accounts/profile
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    if let Some(ref name) = input.first_name {
        validate_name("first_name", name)?;
    }
    if let Some(ref name) = input.last_name {
        validate_name("last_name", name)?;
    }
    if let Some(ref phone) = input.phone_number {
        validate_phone_number(phone)?;
    }
    if let Some(ref email) = input.email {
        let email = normalize_email(email);
        validate_email(&email)?;
        input.email = Some(email);
    }

    if let Some(ref email) = input.email {
        if UserRepo::email_taken(&state.pool, email, Some(auth.user_id)).await? {
            return Err(email_conflict());
        }
    }
    if let Some(ref phone) = input.phone_number {
        if UserRepo::phone_number_taken(&state.pool, phone, Some(auth.user_id)).await? {
            return Err(phone_conflict());
        }
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(DataResponse { data: user.into() }))
}

/// POST /api/v1/accounts/change-password
///
/// Verifies the old password, stores the new one, and revokes every session.
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<DetailResponse>> {
    input.validate()?;
    let user = find_user(&state, auth.user_id).await?;

    let old_valid = verify_password(&input.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !old_valid {
        return Err(AppError::Core(CoreError::Validation(
            "Old password is not correct".into(),
        )));
    }
    validate_password_strength(&input.new_password, state.config.password_min_length)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, revoked, "Password changed");
    Ok(Json(DetailResponse {
        detail: "Password changed successfully",
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

fn email_conflict() -> AppError {
    AppError::Core(CoreError::Conflict(EMAIL_TAKEN.into()))
}

fn phone_conflict() -> AppError {
    AppError::Core(CoreError::Conflict(PHONE_TAKEN.into()))
}

async fn ensure_unique(
    state: &AppState,
    email: &str,
    phone_number: &str,
) -> AppResult<()> {
    if UserRepo::email_taken(&state.pool, email, None).await? {
        return Err(email_conflict());
    }
    if UserRepo::phone_number_taken(&state.pool, phone_number, None).await? {
        return Err(phone_conflict());
    }
    Ok(())
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, role_for(user.is_staff), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at = state.config.jwt.refresh_expires_at(Utc::now());

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: user.into(),
    })
}
