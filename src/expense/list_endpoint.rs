//! The JSON listing of every expense.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    Error,
    database_id::ExpenseId,
    expense::{Amount, Expense, ExpenseState, get_all_expenses},
    html::format_date,
};

/// An expense as it appears in the JSON listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseJson {
    pub id: ExpenseId,
    /// The date formatted as "YYYY-MM-DD".
    pub date: String,
    /// The amount as a decimal string, e.g. "12.50".
    pub amount: Amount,
    pub category: String,
    pub description: String,
}

impl From<Expense> for ExpenseJson {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            date: format_date(expense.date),
            amount: expense.amount,
            category: expense.category,
            description: expense.description,
        }
    }
}

/// List every expense as JSON, newest first.
pub async fn list_expenses_endpoint(State(state): State<ExpenseState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_all_expenses(&connection) {
        Ok(expenses) => Json(
            expenses
                .into_iter()
                .map(ExpenseJson::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(error) => error.into_response(),
    }
}
