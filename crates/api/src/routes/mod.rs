pub mod accounts;
pub mod financials;
pub mod health;
pub mod project;
pub mod subtask;
pub mod task;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /accounts/register                               register (public)
/// /accounts/login                                  login (public)
/// /accounts/login/refresh-token                    refresh (public)
/// /accounts/logout                                 logout
/// /accounts/profile                                get, update
/// /accounts/change-password                        change password
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/complete                          complete
/// /projects/{project_id}/tasks                     list, create
///
/// /tasks/{id}                                      get, update, delete
/// /tasks/{id}/complete                             complete
/// /tasks/{task_id}/subtasks                        list, create
///
/// /subtasks/{id}                                   get, update, delete
/// /subtasks/{id}/complete                          complete
///
/// /financials/outcomes/{target_type}/{target_id}   list, create
/// /financials/outcomes/{id}                        get, update, delete
/// /financials/outcomes/{id}/payment-method         get, update
/// /financials/cash-payments/{id}/complete|cancel   settle
/// /financials/check-payments/{id}/complete|cancel  settle
/// /financials/installments/{id}/schedules          list
/// /financials/installment-schedules/{id}           get, update
/// /financials/installment-schedules/{id}/complete|cancel
/// /financials/projects/{project_id}/incomes        list, create
/// /financials/incomes/{id}                         get, update, delete
/// ```
///
/// Every route except register, login, and refresh requires a bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/subtasks", subtask::router())
        .nest("/financials", financials::router())
}
