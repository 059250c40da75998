//! Defines the endpoint for creating a new expense.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{
    Error, endpoints,
    expense::{
        ExpenseState, create_expense,
        form::{ExpenseFormData, FormAction, expense_form},
        get_categories,
    },
    flash::{Flash, set_flash},
};

/// A route handler for creating a new expense.
///
/// Invalid input re-renders the form with an error next to each offending field.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_expense = match form.validate() {
        Ok(new_expense) => new_expense,
        Err(errors) => {
            let categories = get_categories(&connection).unwrap_or_else(|error| {
                tracing::error!("could not get expense categories: {error}");
                Vec::new()
            });

            return expense_form(FormAction::Create, &form, &errors, &categories).into_response();
        }
    };

    match create_expense(&new_expense, &connection) {
        Ok(expense) => {
            tracing::info!("Created expense {}: {expense}", expense.id);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                set_flash(jar, Flash::success("Expense added successfully!")),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create expense: {error}");
            error.into_alert_response()
        }
    }
}
