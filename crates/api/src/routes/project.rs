//! Route definitions for the `/projects` resource.
//!
//! Also nests task listing and creation under `/projects/{project_id}/tasks`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{project, task};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                         -> list
/// POST   /                         -> create
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update
/// PATCH  /{id}                     -> update
/// DELETE /{id}                     -> delete
/// POST   /{id}/complete            -> complete
///
/// GET    /{id}/tasks               -> task::list
/// POST   /{id}/tasks               -> task::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .patch(project::update)
                .delete(project::delete),
        )
        .route("/{id}/complete", post(project::complete))
        .route("/{id}/tasks", get(task::list).post(task::create))
}
