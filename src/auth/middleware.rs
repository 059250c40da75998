//! Session middleware that resolves each request's [Access], extends sessions,
//! and the guards that redirect clients without the required access.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Access, Token,
        cookie::{COOKIE_SESSION, extend_session_cookie, get_token_from_cookies},
        get_user_by_id,
        redirect::build_log_in_redirect_url,
    },
    endpoints,
    flash::{Flash, set_flash},
};

/// The state needed for the session middleware
#[derive(Clone)]
pub struct SessionState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up staff users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SessionState> for Key {
    fn from_ref(state: &SessionState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware that resolves the session cookie into an [Access] for every request.
///
/// The [Access] is placed into the request extensions, where handlers can
/// extract it as an argument. Requests without a valid session get
/// [Access::default]. Valid sessions are extended by the cookie duration
/// unless the handler already set the session cookie, e.g. on log-in or log-out.
///
/// Staff status is read from the database each time, so changes take effect
/// on the next request. A session whose user no longer exists keeps only its
/// view access.
pub async fn session_middleware(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = get_token_from_cookies(&jar).ok();

    let access = match &token {
        Some(token) => resolve_access(token, &state.db_connection),
        None => Access::default(),
    };

    request.extensions_mut().insert(access);
    let response = next.run(request).await;

    if token.is_none() || sets_session_cookie(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let jar = match extend_session_cookie(jar, state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending session duration: {error}.");
            return Response::from_parts(parts, body);
        }
    };

    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

fn resolve_access(token: &Token, db_connection: &Arc<Mutex<Connection>>) -> Access {
    let view_only = Access {
        user_id: None,
        view_access: token.view_access,
        is_staff: false,
    };

    let Some(user_id) = token.user_id else {
        return view_only;
    };

    let connection = match db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return view_only;
        }
    };

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Access {
            user_id: Some(user.id),
            view_access: token.view_access,
            is_staff: user.is_staff,
        },
        Err(Error::NotFound) => {
            tracing::warn!("Session refers to user {user_id} who no longer exists.");
            view_only
        }
        Err(error) => {
            tracing::error!("Could not look up user {user_id}: {error}");
            view_only
        }
    }
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{COOKIE_SESSION}=");

    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

/// Redirect to `url`, using the `HX-Redirect` header for HTMX requests.
fn redirect(url: &str, is_hx_request: bool) -> Response {
    if is_hx_request {
        (HxRedirect(url.to_owned()), StatusCode::OK).into_response()
    } else {
        Redirect::to(url).into_response()
    }
}

/// Middleware that only lets requests with view access through.
///
/// Other requests are redirected to the log-in page, which will send the
/// client back to the page they wanted after they log in.
pub async fn view_guard(
    access: Access,
    HxRequest(is_hx_request): HxRequest,
    request: Request,
    next: Next,
) -> Response {
    if access.has_view_access() {
        return next.run(request).await;
    }

    let log_in_redirect_url = build_log_in_redirect_url(&request);
    redirect(&log_in_redirect_url, is_hx_request)
}

/// The state needed for the staff guard.
#[derive(Clone)]
pub struct StaffGuardState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The action being guarded, used to complete the sentence
    /// "You don't have permission to ...", e.g. "edit expenses".
    pub action: &'static str,
}

impl StaffGuardState {
    pub fn new(state: &AppState, action: &'static str) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            action,
        }
    }
}

impl FromRef<StaffGuardState> for Key {
    fn from_ref(state: &StaffGuardState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware that only lets staff through.
///
/// Everyone else is redirected to the dashboard with an error message.
pub async fn staff_guard(
    State(state): State<StaffGuardState>,
    access: Access,
    HxRequest(is_hx_request): HxRequest,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    if access.is_staff {
        return next.run(request).await;
    }

    tracing::warn!(
        "Blocked {} {} from a client without staff access.",
        request.method(),
        request.uri()
    );

    let jar = set_flash(
        jar,
        Flash::error(format!("You don't have permission to {}.", state.action)),
    );

    (jar, redirect(endpoints::DASHBOARD_VIEW, is_hx_request)).into_response()
}
