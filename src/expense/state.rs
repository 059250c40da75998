use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the expense pages and endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The key used to encrypt the flash message cookie.
    pub cookie_key: Key,
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<ExpenseState> for Key {
    fn from_ref(state: &ExpenseState) -> Self {
        state.cookie_key.clone()
    }
}
