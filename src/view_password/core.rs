//! Shared family passwords that grant read-only access to the expenses.
//!
//! The passwords are stored and compared as plain text, since staff need to
//! be able to read them back to share with family members.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, database_id::ViewPasswordId};

/// A shared password and who it was given to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPassword {
    pub id: ViewPasswordId,
    pub password: String,
    /// Who the password was given to, e.g. "Mom".
    pub label: String,
    pub created_at: OffsetDateTime,
    /// Only active passwords can be used to log in.
    pub is_active: bool,
}

/// The validated fields for a new view password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewViewPassword {
    pub password: String,
    pub label: String,
}

pub fn create_view_password_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS view_password (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            password TEXT NOT NULL UNIQUE,
            label TEXT NOT NULL,
            created_at TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_view_password(row: &Row) -> Result<ViewPassword, rusqlite::Error> {
    Ok(ViewPassword {
        id: row.get(0)?,
        password: row.get(1)?,
        label: row.get(2)?,
        created_at: row.get(3)?,
        is_active: row.get(4)?,
    })
}

/// Insert a new, active view password created at `created_at`.
///
/// # Errors
///
/// Returns [Error::DuplicateViewPassword] if the password is already in use,
/// whether or not the existing one is active.
pub fn create_view_password(
    view_password: &NewViewPassword,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<ViewPassword, Error> {
    connection.execute(
        "INSERT INTO view_password (password, label, created_at, is_active)
        VALUES (?1, ?2, ?3, 1)",
        (&view_password.password, &view_password.label, created_at),
    )?;

    Ok(ViewPassword {
        id: connection.last_insert_rowid(),
        password: view_password.password.clone(),
        label: view_password.label.clone(),
        created_at,
        is_active: true,
    })
}

/// Find the active view password that exactly matches `password`.
pub fn get_active_view_password(
    password: &str,
    connection: &Connection,
) -> Result<Option<ViewPassword>, Error> {
    let result = connection.query_row(
        "SELECT id, password, label, created_at, is_active FROM view_password
        WHERE password = ?1 AND is_active = 1",
        [password],
        map_row_to_view_password,
    );

    match result {
        Ok(view_password) => Ok(Some(view_password)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Get every view password, newest first.
pub fn get_all_view_passwords(connection: &Connection) -> Result<Vec<ViewPassword>, Error> {
    connection
        .prepare(
            "SELECT id, password, label, created_at, is_active FROM view_password
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([], map_row_to_view_password)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Flip the active flag of the view password with the ID `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such view password.
pub fn toggle_view_password(
    id: ViewPasswordId,
    connection: &Connection,
) -> Result<ViewPassword, Error> {
    connection
        .query_row(
            "UPDATE view_password SET is_active = NOT is_active WHERE id = ?1
            RETURNING id, password, label, created_at, is_active",
            [id],
            map_row_to_view_password,
        )
        .map_err(Error::from)
}

/// Delete the view password with the ID `id`, returning the number of rows deleted.
pub fn delete_view_password(id: ViewPasswordId, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM view_password WHERE id = ?1", [id])
        .map_err(Error::from)
}

/// The number of view passwords that can currently be used to log in.
pub fn count_active_view_passwords(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM view_password WHERE is_active = 1",
            [],
            |row| row.get(0),
        )
        .map_err(Error::from)
}
