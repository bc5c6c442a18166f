//! Route definitions for the `/financials` resource.
//!
//! The first segment under `/outcomes` is always named `{id}`: it carries
//! the outcome id, or the target type on the two-segment listing route.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{income, outcome, payment};
use crate::state::AppState;

/// Routes mounted at `/financials`.
///
/// ```text
/// GET    /outcomes/{target_type}/{target_id}       -> outcome::list_by_target
/// POST   /outcomes/{target_type}/{target_id}       -> outcome::create
/// GET    /outcomes/{id}                            -> outcome::get_by_id
/// PUT    /outcomes/{id}                            -> outcome::update
/// PATCH  /outcomes/{id}                            -> outcome::update
/// DELETE /outcomes/{id}                            -> outcome::delete
/// GET    /outcomes/{id}/payment-method             -> outcome::get_payment_method
/// PUT    /outcomes/{id}/payment-method             -> outcome::update_payment_method
/// PATCH  /outcomes/{id}/payment-method             -> outcome::update_payment_method
///
/// POST   /cash-payments/{id}/complete              -> payment::complete_cash
/// POST   /cash-payments/{id}/cancel                -> payment::cancel_cash
/// POST   /check-payments/{id}/complete             -> payment::complete_check
/// POST   /check-payments/{id}/cancel               -> payment::cancel_check
///
/// GET    /installments/{id}/schedules              -> payment::list_schedules
/// GET    /installment-schedules/{id}               -> payment::get_schedule
/// PUT    /installment-schedules/{id}               -> payment::update_schedule
/// PATCH  /installment-schedules/{id}               -> payment::update_schedule
/// POST   /installment-schedules/{id}/complete      -> payment::complete_schedule
/// POST   /installment-schedules/{id}/cancel        -> payment::cancel_schedule
///
/// GET    /projects/{project_id}/incomes            -> income::list
/// POST   /projects/{project_id}/incomes            -> income::create
/// GET    /incomes/{id}                             -> income::get_by_id
/// PUT    /incomes/{id}                             -> income::update
/// PATCH  /incomes/{id}                             -> income::update
/// DELETE /incomes/{id}                             -> income::delete
/// ```
pub fn router() -> Router<AppState> {
    let outcome_routes = Router::new()
        .route(
            "/{id}",
            get(outcome::get_by_id)
                .put(outcome::update)
                .patch(outcome::update)
                .delete(outcome::delete),
        )
        .route(
            "/{id}/payment-method",
            get(outcome::get_payment_method)
                .put(outcome::update_payment_method)
                .patch(outcome::update_payment_method),
        )
        .route(
            "/{id}/{target_id}",
            get(outcome::list_by_target).post(outcome::create),
        );

    let schedule_routes = Router::new()
        .route(
            "/{id}",
            get(payment::get_schedule)
                .put(payment::update_schedule)
                .patch(payment::update_schedule),
        )
        .route("/{id}/complete", post(payment::complete_schedule))
        .route("/{id}/cancel", post(payment::cancel_schedule));

    let income_routes = Router::new().route(
        "/{id}",
        get(income::get_by_id)
            .put(income::update)
            .patch(income::update)
            .delete(income::delete),
    );

    Router::new()
        .nest("/outcomes", outcome_routes)
        .route("/cash-payments/{id}/complete", post(payment::complete_cash))
        .route("/cash-payments/{id}/cancel", post(payment::cancel_cash))
        .route("/check-payments/{id}/complete", post(payment::complete_check))
        .route("/check-payments/{id}/cancel", post(payment::cancel_check))
        .route("/installments/{id}/schedules", get(payment::list_schedules))
        .nest("/installment-schedules", schedule_routes)
        .route(
            "/projects/{project_id}/incomes",
            get(income::list).post(income::create),
        )
        .nest("/incomes", income_routes)
}
