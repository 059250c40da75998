//! The page listing the view passwords for staff.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::Access,
    endpoints::{self, format_endpoint},
    flash::take_flash,
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, flash_view,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    view_password::{
        ViewPassword, ViewPasswordState,
        form::{ViewPasswordFormData, ViewPasswordFormErrors, view_password_form},
        get_all_view_passwords,
    },
};

const CREATED_AT_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

fn view_passwords_table(view_passwords: &[ViewPassword], local_offset: UtcOffset) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow w-full"
        {
            table id="view-passwords" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Label" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Password" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for view_password in view_passwords {
                        @let created_at = view_password
                            .created_at
                            .to_offset(local_offset)
                            .format(CREATED_AT_FORMAT)
                            .unwrap_or_else(|_| view_password.created_at.to_string());

                        tr class=(TABLE_ROW_STYLE) data-view-password-id=(view_password.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (view_password.label) }
                            td class={(TABLE_CELL_STYLE) " font-mono"} { (view_password.password) }
                            td class=(TABLE_CELL_STYLE) { (created_at) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if view_password.is_active { "Active" } @else { "Inactive" }
                            }
                            td class={(TABLE_CELL_STYLE) " space-x-2"}
                            {
                                button
                                    type="button"
                                    hx-post=(format_endpoint(endpoints::TOGGLE_VIEW_PASSWORD, view_password.id))
                                    hx-target-error="#alert-container"
                                    class=(LINK_STYLE)
                                {
                                    @if view_password.is_active { "Deactivate" } @else { "Activate" }
                                }

                                button
                                    type="button"
                                    hx-delete=(format_endpoint(endpoints::VIEW_PASSWORD, view_password.id))
                                    hx-confirm={"Delete the password for " (view_password.label) "?"}
                                    hx-target-error="#alert-container"
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Delete"
                                }
                            }
                        }
                    }

                    @if view_passwords.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No view passwords yet. Add one below so family members can log in."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Display the view passwords and the form for adding one.
pub async fn get_view_passwords_page(
    State(state): State<ViewPasswordState>,
    access: Access,
    jar: PrivateCookieJar,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let view_passwords = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_all_view_passwords(&connection) {
            Ok(view_passwords) => view_passwords,
            Err(error) => return error.into_response(),
        }
    };

    let (jar, flash) = take_flash(jar);

    let content = html! {
        (NavBar::new(endpoints::VIEW_PASSWORDS_VIEW, access).into_html())
        (flash_view(flash.as_ref()))

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "View passwords" }

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Family members can log in with any active password to view the expenses."
                }

                (view_passwords_table(&view_passwords, local_offset))

                div class=(CARD_STYLE)
                {
                    h2 class="mb-4 text-lg font-semibold" { "Add password" }

                    (view_password_form(
                        &ViewPasswordFormData::default(),
                        &ViewPasswordFormErrors::default(),
                    ))
                }
            }
        }
    };

    (jar, base("View Passwords", &content)).into_response()
}
