//! Defines the endpoint for adding a view password.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use time::OffsetDateTime;

use crate::{
    Error, endpoints,
    flash::{Flash, set_flash},
    view_password::{
        ViewPasswordState, create_view_password,
        form::{
            DUPLICATE_VIEW_PASSWORD_MSG, ViewPasswordFormData, ViewPasswordFormErrors,
            view_password_form,
        },
    },
};

/// A route handler for adding a view password.
///
/// Invalid input and passwords that are already in use re-render the form
/// with an error message.
pub async fn create_view_password_endpoint(
    State(state): State<ViewPasswordState>,
    jar: PrivateCookieJar,
    Form(form): Form<ViewPasswordFormData>,
) -> Response {
    let new_view_password = match form.validate() {
        Ok(new_view_password) => new_view_password,
        Err(errors) => return view_password_form(&form, &errors).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_view_password(&new_view_password, OffsetDateTime::now_utc(), &connection) {
        Ok(view_password) => {
            tracing::info!("Created view password {} for {}", view_password.id, view_password.label);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::VIEW_PASSWORDS_VIEW.to_owned()),
                set_flash(
                    jar,
                    Flash::success(format!(
                        "View password for {} added successfully!",
                        view_password.label
                    )),
                ),
            )
                .into_response()
        }
        Err(Error::DuplicateViewPassword) => view_password_form(
            &form,
            &ViewPasswordFormErrors {
                password: Some(DUPLICATE_VIEW_PASSWORD_MSG.to_owned()),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not create view password: {error}");
            error.into_alert_response()
        }
    }
}
