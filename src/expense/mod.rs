mod core;
mod create_endpoint;
mod delete_endpoint;
mod delete_page;
mod edit_endpoint;
mod edit_page;
mod form;
mod list_endpoint;
mod state;

pub use core::{
    Amount, Expense, NewExpense, SortOrder, create_expense, create_expense_table, delete_expense,
    get_all_expenses, get_categories, get_expense, get_expenses_in_range, update_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use delete_page::get_delete_expense_page;
pub use edit_endpoint::edit_expense_endpoint;
pub use edit_page::get_edit_expense_page;
pub use form::{ExpenseFormData, ExpenseFormErrors, FormAction, expense_form};
pub use list_endpoint::list_expenses_endpoint;
pub use state::ExpenseState;
