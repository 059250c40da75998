//! The expense model and the database queries for expenses.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::ExpenseId, html::format_date};

/// An exact amount of money in rupees, always with two decimal places.
///
/// Amounts are stored as text so that no precision is lost, and serialized as
/// a decimal string, e.g. `"12.50"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create an amount from `value`, rounded to two decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut value = value;
        value.rescale(2);
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self::new)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self::new(iter.map(|amount| amount.0).sum())
    }
}

impl<'a> std::iter::Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Amount::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A single dated expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub date: Date,
    pub amount: Amount,
    pub category: String,
    pub description: String,
}

impl Display for Expense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - ₹{} - {}",
            format_date(self.date),
            self.amount,
            self.category
        )
    }
}

/// The validated fields for creating or updating an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub date: Date,
    pub amount: Amount,
    pub category: String,
    pub description: String,
}

/// The order to list expenses in. Ties on the date are broken by ID in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ORDER BY date ASC, id ASC",
            SortOrder::Descending => "ORDER BY date DESC, id DESC",
        }
    }
}

pub type RowsAffected = usize;

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT ''
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date)",
        (),
    )?;

    Ok(())
}

fn map_row_to_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Insert a new expense.
///
/// # Errors
///
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn create_expense(expense: &NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (date, amount, category, description) VALUES (?1, ?2, ?3, ?4)",
        (
            &expense.date,
            &expense.amount,
            &expense.category,
            &expense.description,
        ),
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        date: expense.date,
        amount: expense.amount,
        category: expense.category.clone(),
        description: expense.description.clone(),
    })
}

/// Get the expense with the ID `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such expense.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .query_one(
            "SELECT id, date, amount, category, description FROM expense WHERE id = ?1",
            [id],
            map_row_to_expense,
        )
        .map_err(Error::from)
}

/// Overwrite the fields of the expense with the ID `id`.
///
/// Returns the number of rows affected, zero if the expense does not exist.
pub fn update_expense(
    id: ExpenseId,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE expense SET date = ?1, amount = ?2, category = ?3, description = ?4
            WHERE id = ?5",
            (
                &expense.date,
                &expense.amount,
                &expense.category,
                &expense.description,
                id,
            ),
        )
        .map_err(Error::from)
}

/// Delete the expense with the ID `id`.
///
/// Returns the number of rows affected, zero if the expense does not exist.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM expense WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

/// Get the expenses whose date is within `date_range`, inclusive of both ends.
pub fn get_expenses_in_range(
    date_range: RangeInclusive<Date>,
    order: SortOrder,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let query = format!(
        "SELECT id, date, amount, category, description FROM expense
        WHERE date BETWEEN ?1 AND ?2 {}",
        order.as_sql()
    );

    connection
        .prepare(&query)?
        .query_map((date_range.start(), date_range.end()), map_row_to_expense)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get every expense, newest first.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    let query = format!(
        "SELECT id, date, amount, category, description FROM expense {}",
        SortOrder::Descending.as_sql()
    );

    connection
        .prepare(&query)?
        .query_map([], map_row_to_expense)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// The distinct categories used so far, in alphabetical order.
pub fn get_categories(connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare("SELECT DISTINCT category FROM expense ORDER BY category")?
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}
