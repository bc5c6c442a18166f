//! Tests for `AppError` -> HTTP response mapping. These call `IntoResponse`
//! directly; the constraint cases provoke real Postgres errors first.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use sqlx::PgPool;
use taskfund_api::error::{AppError, EMAIL_TAKEN, PHONE_TAKEN};
use taskfund_core::error::CoreError;
use taskfund_db::error::WriteError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Project",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Project with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("title cannot be empty".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "title cannot be empty");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("Project is already completed".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Project is already completed");
}

#[tokio::test]
async fn unauthorized_and_forbidden_map_to_401_and_403() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("not yours".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret connection string".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Internal("stack trace".into()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!json.to_string().contains("stack trace"));
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn rejected_write_maps_like_core_error() {
    let err: AppError = WriteError::Rejected(CoreError::Validation(
        "budget exceeds the project budget. Remaining budget: 400.".into(),
    ))
    .into();
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let err: AppError = WriteError::Database(sqlx::Error::RowNotFound).into();
    let (status, _) = error_to_response(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn insert_user(pool: &PgPool, phone: &str, email: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (first_name, last_name, phone_number, email, gender, password_hash)
         VALUES ('A', 'B', $1, $2, 'male', 'hash')
         RETURNING id",
    )
    .bind(phone)
    .bind(email)
    .fetch_one(pool)
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_account_fields_map_to_account_messages(pool: PgPool) {
    insert_user(&pool, "09120000001", "a@example.com").await.unwrap();

    let err = insert_user(&pool, "09120000002", "a@example.com").await.unwrap_err();
    let (status, json) = error_to_response(AppError::Database(err)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], EMAIL_TAKEN);

    let err = insert_user(&pool, "09120000001", "b@example.com").await.unwrap_err();
    let (status, json) = error_to_response(AppError::Database(err)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], PHONE_TAKEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_and_foreign_key_violations_are_client_errors(pool: PgPool) {
    let ceo_id = insert_user(&pool, "09120000001", "a@example.com").await.unwrap();

    let err = sqlx::query("INSERT INTO projects (title, ceo_id, budget) VALUES ('P', $1, 0)")
        .bind(ceo_id)
        .execute(&pool)
        .await
        .unwrap_err();
    let (status, json) = error_to_response(AppError::Database(err)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let err = sqlx::query("INSERT INTO projects (title, ceo_id) VALUES ('P', $1)")
        .bind(ceo_id + 1000)
        .execute(&pool)
        .await
        .unwrap_err();
    let (status, json) = error_to_response(AppError::Database(err)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
