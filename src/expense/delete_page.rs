use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    auth::Access,
    database_id::ExpenseId,
    endpoints::{self, format_endpoint},
    expense::{ExpenseState, get_expense},
    html::{BUTTON_DANGER_STYLE, CARD_STYLE, FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
};

/// Renders the page asking the user to confirm that an expense should be deleted.
pub async fn get_delete_expense_page(
    State(state): State<ExpenseState>,
    access: Access,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let expense = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_expense(expense_id, &connection) {
            Ok(expense) => expense,
            Err(error) => return error.into_response(),
        }
    };

    let nav_bar = NavBar::new(endpoints::DELETE_EXPENSE_VIEW, access).into_html();
    let delete_url = format_endpoint(endpoints::EXPENSE, expense_id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class=(CARD_STYLE)
            {
                h1 class="mb-4 text-xl font-bold" { "Delete expense" }

                p class="mb-2" { "Are you sure you want to delete this expense?" }

                p id="expense-summary" class="mb-2 font-semibold" { (expense.to_string()) }

                @if !expense.description.is_empty() {
                    p class="mb-4 text-sm text-gray-600 dark:text-gray-400" { (expense.description) }
                }

                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-target-error="#alert-container"
                    class=(BUTTON_DANGER_STYLE)
                {
                    "Delete"
                }

                p class="mt-4 text-sm" { (link(endpoints::DASHBOARD_VIEW, "Cancel")) }
            }
        }
    };

    base("Delete Expense", &content).into_response()
}
