//! Staff and family log-in, sessions, and the access checks applied to each route.

mod access;
mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod token;
mod user;

pub use access::Access;
pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_session_cookie, set_session_cookie};
pub use log_in::{get_log_in_page, post_log_in, post_view_log_in};
pub use log_out::get_log_out;
pub use middleware::{StaffGuardState, session_middleware, staff_guard, view_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::normalize_redirect_url;
pub(crate) use token::Token;
pub use user::{User, UserID, create_user, create_user_table, get_user_by_id, get_user_by_username};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
