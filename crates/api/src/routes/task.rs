//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{subtask, task};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update
/// PATCH  /{id}                     -> update
/// DELETE /{id}                     -> delete
/// POST   /{id}/complete            -> complete
///
/// GET    /{id}/subtasks            -> subtask::list
/// POST   /{id}/subtasks            -> subtask::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(task::get_by_id)
                .put(task::update)
                .patch(task::update)
                .delete(task::delete),
        )
        .route("/{id}/complete", post(task::complete))
        .route("/{id}/subtasks", get(subtask::list).post(subtask::create))
}
