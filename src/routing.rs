//! Application router configuration with public, view-only and staff-only route definitions.

use axum::{
    Router,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        StaffGuardState, get_log_in_page, get_log_out, post_log_in, post_view_log_in,
        session_middleware, staff_guard, view_guard,
    },
    dashboard::{get_dashboard_page, get_monthly_page},
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, edit_expense_endpoint,
        get_delete_expense_page, get_edit_expense_page, list_expenses_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    view_password::{
        create_view_password_endpoint, delete_view_password_endpoint, get_view_passwords_page,
        toggle_view_password_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::VIEW_LOG_IN_API, post(post_view_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let view_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::MONTHLY_VIEW, get(get_monthly_page))
        .route(endpoints::EXPENSES_API, get(list_expenses_endpoint))
        .route_layer(middleware::from_fn(view_guard));

    let add_expense_routes = Router::new()
        .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
        .route_layer(middleware::from_fn_with_state(
            StaffGuardState::new(&state, "add expenses"),
            staff_guard,
        ));

    let edit_expense_routes = Router::new()
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(endpoints::EXPENSE, put(edit_expense_endpoint))
        .route_layer(middleware::from_fn_with_state(
            StaffGuardState::new(&state, "edit expenses"),
            staff_guard,
        ));

    let delete_expense_routes = Router::new()
        .route(endpoints::DELETE_EXPENSE_VIEW, get(get_delete_expense_page))
        .route(endpoints::EXPENSE, delete(delete_expense_endpoint))
        .route_layer(middleware::from_fn_with_state(
            StaffGuardState::new(&state, "delete expenses"),
            staff_guard,
        ));

    let view_password_routes = Router::new()
        .route(endpoints::VIEW_PASSWORDS_VIEW, get(get_view_passwords_page))
        .route(
            endpoints::VIEW_PASSWORDS_API,
            post(create_view_password_endpoint),
        )
        .route(
            endpoints::TOGGLE_VIEW_PASSWORD,
            post(toggle_view_password_endpoint),
        )
        .route(
            endpoints::VIEW_PASSWORD,
            delete(delete_view_password_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(
            StaffGuardState::new(&state, "manage view passwords"),
            staff_guard,
        ));

    // Routes sharing a path with different methods, e.g. GET and POST on the
    // expenses API, are merged into one method router per path.
    public_routes
        .merge(view_routes)
        .merge(add_expense_routes)
        .merge(edit_expense_routes)
        .merge(delete_expense_routes)
        .merge(view_password_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
