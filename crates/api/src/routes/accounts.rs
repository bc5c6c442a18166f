//! Route definitions for the `/accounts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Routes mounted at `/accounts`.
///
/// ```text
/// POST  /register               -> register
/// POST  /login                  -> login
/// POST  /login/refresh-token    -> refresh
/// POST  /logout                 -> logout (requires auth)
/// GET   /profile                -> get_profile
/// PUT   /profile                -> update_profile
/// PATCH /profile                -> update_profile
/// POST  /change-password        -> change_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/login/refresh-token", post(accounts::refresh))
        .route("/logout", post(accounts::logout))
        .route(
            "/profile",
            get(accounts::get_profile)
                .put(accounts::update_profile)
                .patch(accounts::update_profile),
        )
        .route("/change-password", post(accounts::change_password))
}
