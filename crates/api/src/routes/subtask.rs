//! Route definitions for the `/subtasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::subtask;
use crate::state::AppState;

/// Routes mounted at `/subtasks`.
///
/// ```text
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update
/// PATCH  /{id}                     -> update
/// DELETE /{id}                     -> delete
/// POST   /{id}/complete            -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(subtask::get_by_id)
                .put(subtask::update)
                .patch(subtask::update)
                .delete(subtask::delete),
        )
        .route("/{id}/complete", post(subtask::complete))
}
