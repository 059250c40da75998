use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;

use crate::AppState;

/// The state needed to manage view passwords.
#[derive(Debug, Clone)]
pub struct ViewPasswordState {
    /// The key used to encrypt the flash message cookie.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ViewPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<ViewPasswordState> for Key {
    fn from_ref(state: &ViewPasswordState) -> Self {
        state.cookie_key.clone()
    }
}
