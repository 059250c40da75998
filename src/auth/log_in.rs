//! This file defines the routes for displaying the log-in page and handling
//! log-in requests, both for staff users and for the family view password.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        UserID, get_user_by_username, invalidate_session_cookie, normalize_redirect_url,
        set_session_cookie,
    },
    endpoints,
    flash::{Flash, set_flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, field_error,
        flash_view, log_in_card,
    },
    view_password::get_active_view_password,
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid username or password.";
pub const INVALID_VIEW_PASSWORD_ERROR_MSG: &str = "Invalid view password.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn redirect_input(redirect_url: Option<&str>) -> Markup {
    html! {
        @if let Some(redirect_url) = redirect_url {
            input type="hidden" name="redirect_url" value=(redirect_url);
        }
    }
}

fn log_in_form(username: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            id="log-in-form"
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            class="space-y-4 md:space-y-6"
        {
            (redirect_input(redirect_url))

            div
            {
                label for="username" class=(FORM_LABEL_STYLE) { "Username" }

                input
                    type="text"
                    name="username"
                    id="username"
                    value=(username)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    type="password"
                    name="password"
                    id="password"
                    placeholder="••••••••"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(error_message))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }
        }
    }
}

fn view_log_in_form(error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            id="view-log-in-form"
            hx-post=(endpoints::VIEW_LOG_IN_API)
            hx-swap="outerHTML"
            class="space-y-4 md:space-y-6"
        {
            (redirect_input(redirect_url))

            div
            {
                label for="view-password" class=(FORM_LABEL_STYLE) { "Family password" }

                input
                    type="password"
                    name="password"
                    id="view-password"
                    placeholder="••••••••"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(error_message))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "View expenses" }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page with the staff and family log-in forms.
pub async fn get_log_in_page(jar: PrivateCookieJar, Query(query): Query<RedirectQuery>) -> Response {
    let (jar, flash) = take_flash(jar);
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let redirect_url = redirect_url.as_deref();

    let content = html! {
        (flash_view(flash.as_ref()))

        div class="flex flex-col items-center gap-6 px-6 py-8 mx-auto lg:py-16"
        {
            (log_in_card("Log in as staff", &log_in_form("", None, redirect_url)))
            (log_in_card("Family view", &view_log_in_form(None, redirect_url)))
        }
    };

    (jar, base("Log In", &content)).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the staff log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    pub username: String,
    pub password: String,
    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// The raw data entered in the family log-in form.
#[derive(Clone, Deserialize)]
pub struct ViewLogInData {
    pub password: String,
    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Set the session cookie and flash message, then send the client on to `redirect_url`.
fn log_in_response(
    jar: PrivateCookieJar,
    state: &LoginState,
    user_id: Option<UserID>,
    welcome: String,
    redirect_url: Option<&str>,
) -> Response {
    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_session_cookie(jar.clone(), user_id, true, state.cookie_duration) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            set_flash(updated_jar, Flash::success(welcome)),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting session cookie: {error}");
            session_error_response(jar)
        }
    }
}

/// Send the client to the error page and clear any session it had.
fn session_error_response(jar: PrivateCookieJar) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        invalidate_session_cookie(jar),
    )
        .into_response()
}

/// Handler for staff log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client is
/// redirected to the dashboard page, or the page they came from.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let form_with_error =
        |message: &str| log_in_form(&user_data.username, Some(message), redirect_url);

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return form_with_error(INTERNAL_ERROR_MSG).into_response();
            }
        };

        match get_user_by_username(&user_data.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return form_with_error(INVALID_CREDENTIALS_ERROR_MSG).into_response();
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return form_with_error(INTERNAL_ERROR_MSG).into_response();
            }
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => return form_with_error(INVALID_CREDENTIALS_ERROR_MSG).into_response(),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return form_with_error(INTERNAL_ERROR_MSG).into_response();
        }
    }

    tracing::info!("User {} logged in.", user.id);

    log_in_response(
        jar,
        &state,
        Some(user.id),
        format!("Welcome back, {}!", user.username),
        redirect_url,
    )
}

/// Handler for family log-in requests with a shared view password.
///
/// Only active view passwords grant access. The session has view access but
/// no user, so it can never perform staff actions.
pub async fn post_view_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(form): Form<ViewLogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "view log-in form");
    let redirect_url = redirect_url.as_deref();

    let view_password = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return view_log_in_form(Some(INTERNAL_ERROR_MSG), redirect_url).into_response();
            }
        };

        match get_active_view_password(&form.password, &connection) {
            Ok(Some(view_password)) => view_password,
            Ok(None) => {
                return view_log_in_form(Some(INVALID_VIEW_PASSWORD_ERROR_MSG), redirect_url)
                    .into_response();
            }
            Err(error) => {
                tracing::error!("Unhandled error while checking view password: {error}");
                return view_log_in_form(Some(INTERNAL_ERROR_MSG), redirect_url).into_response();
            }
        }
    };

    tracing::info!("Family log-in with view password {}.", view_password.id);

    log_in_response(
        jar,
        &state,
        None,
        format!("Welcome, {}!", view_password.label),
        redirect_url,
    )
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use scraper::Selector;
    use sha2::{Digest, Sha512};
    use time::OffsetDateTime;

    use crate::{
        auth::{
            DEFAULT_COOKIE_DURATION, PasswordHash, UserID, ValidatedPassword,
            cookie::get_token_from_cookies, create_user, set_session_cookie,
        },
        db::initialize,
        endpoints,
        flash::{Flash, take_flash},
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, parse_html_document,
            parse_html_fragment,
        },
        view_password::{NewViewPassword, create_view_password, toggle_view_password},
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, INVALID_VIEW_PASSWORD_ERROR_MSG, LogInData, LoginState,
        RedirectQuery, ViewLogInData, get_log_in_page, post_log_in, post_view_log_in,
        session_error_response,
    };

    const STAFF_PASSWORD: &str = "roostersgocockledoodledoo";

    fn get_state() -> LoginState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let password_hash =
            PasswordHash::new(ValidatedPassword::new(STAFF_PASSWORD, &[]).unwrap(), 4).unwrap();
        create_user("alice", password_hash, true, &connection).unwrap();
        create_view_password(
            &NewViewPassword {
                password: "family-secret".to_owned(),
                label: "Mom".to_owned(),
            },
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();

        LoginState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_jar(state: &LoginState) -> PrivateCookieJar {
        PrivateCookieJar::new(state.cookie_key.clone())
    }

    /// Rebuild the cookie jar the client would send after receiving `response`.
    fn jar_from_response(state: &LoginState, response: &Response) -> PrivateCookieJar {
        let mut headers = axum::http::HeaderMap::new();
        for value in response.headers().get_all("set-cookie") {
            let cookie = value.to_str().unwrap().split(';').next().unwrap().to_owned();
            headers.append("cookie", cookie.parse().unwrap());
        }

        PrivateCookieJar::from_headers(&headers, state.cookie_key.clone())
    }

    #[tokio::test]
    async fn log_in_page_displays_both_forms() {
        let state = get_state();
        let response = get_log_in_page(
            get_jar(&state),
            Query(RedirectQuery { redirect_url: None }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let forms = document
            .select(&Selector::parse("form").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(forms.len(), 2, "want 2 forms, got {}", forms.len());
        assert_eq!(forms[0].value().attr("hx-post"), Some(endpoints::LOG_IN_API));
        assert_eq!(
            forms[1].value().attr("hx-post"),
            Some(endpoints::VIEW_LOG_IN_API)
        );
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let state = get_state();
        let redirect_url = "/dashboard?year=2025&month=3";

        let response = get_log_in_page(
            get_jar(&state),
            Query(RedirectQuery {
                redirect_url: Some(redirect_url.to_owned()),
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        let hidden_inputs = document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(hidden_inputs.len(), 2);
        for input in hidden_inputs {
            assert_eq!(input.value().attr("value"), Some(redirect_url));
        }
    }

    #[tokio::test]
    async fn staff_log_in_succeeds() {
        let state = get_state();
        let response = post_log_in(
            State(state.clone()),
            get_jar(&state),
            Form(LogInData {
                username: "alice".to_owned(),
                password: STAFF_PASSWORD.to_owned(),
                redirect_url: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);

        let jar = jar_from_response(&state, &response);
        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.user_id, Some(UserID::new(1)));
        assert!(token.view_access);
        let (_, flash) = take_flash(jar);
        assert_eq!(flash, Some(Flash::success("Welcome back, alice!")));
    }

    #[test]
    fn session_error_sends_client_to_error_page_without_session() {
        let state = get_state();
        let jar = set_session_cookie(
            get_jar(&state),
            Some(UserID::new(1)),
            true,
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();

        let response = session_error_response(jar);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_hx_redirect(&response, endpoints::INTERNAL_ERROR_VIEW);
        let jar = jar_from_response(&state, &response);
        assert!(get_token_from_cookies(&jar).is_err());
    }

    #[tokio::test]
    async fn staff_log_in_redirects_to_requested_page() {
        let state = get_state();
        let response = post_log_in(
            State(state.clone()),
            get_jar(&state),
            Form(LogInData {
                username: "alice".to_owned(),
                password: STAFF_PASSWORD.to_owned(),
                redirect_url: Some("/passwords".to_owned()),
            }),
        )
        .await;

        assert_hx_redirect(&response, endpoints::VIEW_PASSWORDS_VIEW);
    }

    #[tokio::test]
    async fn staff_log_in_with_wrong_password_shows_error() {
        let state = get_state();
        let response = post_log_in(
            State(state.clone()),
            get_jar(&state),
            Form(LogInData {
                username: "alice".to_owned(),
                password: "wrongpassword".to_owned(),
                redirect_url: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        assert_valid_html(&fragment);
        let form = fragment
            .select(&Selector::parse("form").unwrap())
            .next()
            .unwrap();
        assert_form_error_message(&form, INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn staff_log_in_with_unknown_user_shows_same_error() {
        let state = get_state();
        let response = post_log_in(
            State(state.clone()),
            get_jar(&state),
            Form(LogInData {
                username: "mallory".to_owned(),
                password: STAFF_PASSWORD.to_owned(),
                redirect_url: None,
            }),
        )
        .await;

        let fragment = parse_html_fragment(response).await;
        let form = fragment
            .select(&Selector::parse("form").unwrap())
            .next()
            .unwrap();
        assert_form_error_message(&form, INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn active_view_password_grants_view_access() {
        let state = get_state();
        let response = post_view_log_in(
            State(state.clone()),
            get_jar(&state),
            Form(ViewLogInData {
                password: "family-secret".to_owned(),
                redirect_url: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let jar = jar_from_response(&state, &response);
        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.user_id, None);
        assert!(token.view_access);
        let (_, flash) = take_flash(jar);
        assert_eq!(flash, Some(Flash::success("Welcome, Mom!")));
    }

    #[tokio::test]
    async fn inactive_view_password_is_rejected() {
        let state = get_state();
        toggle_view_password(1, &state.db_connection.lock().unwrap()).unwrap();

        let response = post_view_log_in(
            State(state.clone()),
            get_jar(&state),
            Form(ViewLogInData {
                password: "family-secret".to_owned(),
                redirect_url: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_none());
        let fragment = parse_html_fragment(response).await;
        let form = fragment
            .select(&Selector::parse("form").unwrap())
            .next()
            .unwrap();
        assert_form_error_message(&form, INVALID_VIEW_PASSWORD_ERROR_MSG);
    }

    #[tokio::test]
    async fn unknown_view_password_is_rejected() {
        let state = get_state();
        let response = post_view_log_in(
            State(state.clone()),
            get_jar(&state),
            Form(ViewLogInData {
                password: "guess".to_owned(),
                redirect_url: None,
            }),
        )
        .await;

        assert!(response.headers().get("set-cookie").is_none());
        let fragment = parse_html_fragment(response).await;
        let form = fragment
            .select(&Selector::parse("form").unwrap())
            .next()
            .unwrap();
        assert_form_error_message(&form, INVALID_VIEW_PASSWORD_ERROR_MSG);
    }
}
