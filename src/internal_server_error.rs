//! The 500 page shown when a request fails for a reason the client cannot fix, such as a
//! poisoned database lock or a misconfigured timezone.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// What went wrong on the server and what the person running it can do about it.
pub struct InternalServerError {
    pub description: &'static str,
    pub fix: String,
}

impl InternalServerError {
    /// The page for failures with nothing useful to tell the family.
    pub fn unexpected() -> Self {
        Self {
            description: "Sorry, the expenses could not be loaded.",
            fix: "Try again in a moment. If it keeps happening, check the server logs.".to_owned(),
        }
    }

    /// The page for a server started with a timezone name that could not be resolved.
    pub fn invalid_timezone(timezone: &str) -> Self {
        Self {
            description: "Invalid timezone settings",
            fix: format!(
                "The server could not resolve the timezone \"{timezone}\" needed to work out \
                today's date. Restart it with a canonical name such as \"Asia/Kolkata\"."
            ),
        }
    }
}

impl IntoResponse for InternalServerError {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, &self.fix);
        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

/// The page HTMX handlers redirect to after a failure they cannot render inline.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::unexpected().into_response()
}
