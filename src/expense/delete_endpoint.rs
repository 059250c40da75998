//! Defines the endpoint for deleting an expense.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    database_id::ExpenseId,
    endpoints,
    expense::{ExpenseState, delete_expense},
    flash::{Flash, set_flash},
};

/// A route handler for deleting an expense, responds with an alert fragment on failure.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    jar: PrivateCookieJar,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(expense_id, &connection) {
        Ok(0) => Error::DeleteMissingExpense.into_alert_response(),
        Ok(_) => {
            tracing::info!("Deleted expense {expense_id}");

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                set_flash(jar, Flash::success("Expense deleted successfully!")),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
