//! Defines the endpoint for updating an expense.

use axum::{
    Form,
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
    expense::{
        ExpenseState,
        form::{ExpenseFormData, FormAction, expense_form},
        get_categories, update_expense,
    },
    flash::{Flash, set_flash},
};

pub async fn edit_expense_endpoint(
    State(state): State<ExpenseState>,
    jar: PrivateCookieJar,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<ExpenseFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let expense = match form.validate() {
        Ok(expense) => expense,
        Err(errors) => {
            let categories = get_categories(&connection).unwrap_or_else(|error| {
                tracing::error!("could not get expense categories: {error}");
                Vec::new()
            });

            return expense_form(FormAction::Update(expense_id), &form, &errors, &categories)
                .into_response();
        }
    };

    match update_expense(expense_id, &expense, &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            set_flash(jar, Flash::success("Expense updated successfully!")),
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
