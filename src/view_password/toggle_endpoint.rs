//! Defines the endpoint for activating or deactivating a view password.

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
    view_password::{ViewPasswordState, count_active_view_passwords, toggle_view_password},
};

pub(super) const NO_ACTIVE_PASSWORDS_WARNING: &str =
    "There are no active view passwords left, so family members cannot log in.";

pub async fn toggle_view_password_endpoint(
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

    let view_password = match toggle_view_password(password_id, &connection) {
        Ok(view_password) => view_password,
        Err(Error::NotFound) => return Error::ToggleMissingViewPassword.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not toggle view password {password_id}: {error}");
            return error.into_alert_response();
        }
    };

    let status = if view_password.is_active {
        "activated"
    } else {
        "deactivated"
    };
    tracing::info!("View password {password_id} {status}");

    let mut message = format!("View password for {} {status}.", view_password.label);
    if !view_password.is_active && matches!(count_active_view_passwords(&connection), Ok(0)) {
        message = format!("{message} {NO_ACTIVE_PASSWORDS_WARNING}");
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::VIEW_PASSWORDS_VIEW.to_owned()),
        set_flash(jar, Flash::success(message)),
    )
        .into_response()
}
