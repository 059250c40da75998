//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page showing the month's expenses and totals.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the expenses of a single month.
pub const MONTHLY_VIEW: &str = "/expenses/{year}/{month}";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expense/edit/{expense_id}";
/// The page asking for confirmation before deleting an expense.
pub const DELETE_EXPENSE_VIEW: &str = "/expense/delete/{expense_id}";
/// The page for managing the shared view passwords.
pub const VIEW_PASSWORDS_VIEW: &str = "/passwords";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a staff user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for logging in with a shared view password.
pub const VIEW_LOG_IN_API: &str = "/api/view_log_in";
/// The route for the client to log out.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to list (GET, JSON) and create (POST) expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to update or delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to create a view password.
pub const VIEW_PASSWORDS_API: &str = "/api/passwords";
/// The route to delete a view password.
pub const VIEW_PASSWORD: &str = "/api/passwords/{password_id}";
/// The route to activate or deactivate a view password.
pub const TOGGLE_VIEW_PASSWORD: &str = "/api/passwords/{password_id}/toggle";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

/// The URL of the monthly view for `year` and `month`.
pub fn format_monthly_endpoint(year: i32, month: u8) -> String {
    format!("/expenses/{year}/{month}")
}
