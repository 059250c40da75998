//! Defines the endpoint for deleting a view password.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    database_id::ViewPasswordId,
    endpoints,
    flash::{Flash, set_flash},
    view_password::{
        ViewPasswordState, count_active_view_passwords, delete_view_password,
        toggle_endpoint::NO_ACTIVE_PASSWORDS_WARNING,
    },
};

pub async fn delete_view_password_endpoint(
    State(state): State<ViewPasswordState>,
    jar: PrivateCookieJar,
    Path(password_id): Path<ViewPasswordId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_view_password(password_id, &connection) {
        Ok(0) => Error::DeleteMissingViewPassword.into_alert_response(),
        Ok(_) => {
            tracing::info!("Deleted view password {password_id}");

            let message = match count_active_view_passwords(&connection) {
                Ok(0) => format!("View password deleted successfully! {NO_ACTIVE_PASSWORDS_WARNING}"),
                _ => "View password deleted successfully!".to_owned(),
            };

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::VIEW_PASSWORDS_VIEW.to_owned()),
                set_flash(jar, Flash::success(message)),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete view password {password_id}: {error}");
            error.into_alert_response()
        }
    }
}
