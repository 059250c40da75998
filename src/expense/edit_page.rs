use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    auth::Access,
    database_id::ExpenseId,
    endpoints,
    expense::{
        ExpenseState,
        form::{ExpenseFormData, ExpenseFormErrors, FormAction, expense_form},
        get_categories, get_expense,
    },
    html::{CARD_STYLE, FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
};

/// Renders the page for editing an expense.
pub async fn get_edit_expense_page(
    State(state): State<ExpenseState>,
    access: Access,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let expense = match get_expense(expense_id, &connection) {
        Ok(expense) => expense,
        Err(error) => return error.into_response(),
    };

    let categories = match get_categories(&connection) {
        Ok(categories) => categories,
        Err(error) => return error.into_response(),
    };

    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW, access).into_html();
    let form = expense_form(
        FormAction::Update(expense_id),
        &ExpenseFormData::from(&expense),
        &ExpenseFormErrors::default(),
        &categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class=(CARD_STYLE)
            {
                h1 class="mb-4 text-xl font-bold" { "Edit expense" }

                (form)

                p class="mt-4 text-sm" { (link(endpoints::DASHBOARD_VIEW, "Cancel")) }
            }
        }
    };

    base("Edit Expense", &content).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::cookie::Key;
    use sha2::{Digest, Sha512};
    use time::macros::date;

    use crate::{
        auth::Access,
        endpoints::{self, format_endpoint},
        expense::{ExpenseState, NewExpense, create_expense},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html,
            get_test_connection, must_get_form, parse_html_document,
        },
    };

    use super::get_edit_expense_page;

    fn staff() -> Access {
        Access {
            user_id: None,
            view_access: true,
            is_staff: true,
        }
    }

    #[tokio::test]
    async fn edit_page_prefills_form() {
        let connection = get_test_connection();
        let expense = create_expense(
            &NewExpense {
                date: date!(2025 - 03 - 14),
                amount: "99.9".parse().unwrap(),
                category: "Bills".to_owned(),
                description: "Electricity".to_owned(),
            },
            &connection,
        )
        .unwrap();
        let state = ExpenseState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_expense_page(State(state), staff(), Path(expense.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::EXPENSE, expense.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "date", "date", "2025-03-14");
        assert_form_input_with_value(&form, "amount", "number", "99.90");
        assert_form_input_with_value(&form, "category", "text", "Bills");
    }

    #[tokio::test]
    async fn edit_page_for_missing_expense_is_404() {
        let state = ExpenseState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response = get_edit_expense_page(State(state), staff(), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
