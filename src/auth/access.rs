//! The access level of the client making a request.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::UserID;

/// What the client making the current request is allowed to do.
///
/// The session middleware resolves the session cookie into an [Access] and
/// stores it in the request extensions. Handlers and guards extract it as an
/// argument; requests that never passed through the middleware, or that have
/// no valid session, get [Access::default], which grants nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Access {
    /// The signed-in staff user, if any.
    pub user_id: Option<UserID>,
    /// Whether the session was granted read access, by either log-in method.
    pub view_access: bool,
    /// Whether the signed-in user is currently a staff member.
    pub is_staff: bool,
}

impl Access {
    /// Staff can always view, everyone else needs the view flag.
    pub fn has_view_access(&self) -> bool {
        self.view_access || self.is_staff
    }
}

impl<S> FromRequestParts<S> for Access
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Access>().copied().unwrap_or_default())
    }
}
