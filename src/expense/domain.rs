//! Core expense domain types and database queries.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, OffsetDateTime};

use crate::Error;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of an expense.
///
/// Rendered as a string in JSON, e.g. `"42"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpenseId(i64);

impl ExpenseId {
    /// Create a new expense ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the expense ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ExpenseId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Serialize for ExpenseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExpenseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw_id = String::deserialize(deserializer)?;

        raw_id.parse().map_err(serde::de::Error::custom)
    }
}

/// Money spent by a user on something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// Who spent the money.
    pub username: String,
    /// What the money was spent on.
    pub description: String,
    /// How much was spent, always greater than zero.
    pub amount: f64,
    /// The day the money was spent.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// When the expense was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the expense was last written to.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated expense that has not been saved yet.
///
/// Guarantees a non-empty username and description, and a positive amount.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    username: String,
    description: String,
    amount: f64,
    date: Date,
}

impl NewExpense {
    /// Validate the fields for a new expense.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidInput] if `username` or
    /// `description` is empty, or if `amount` is not a finite number greater
    /// than zero.
    pub fn new(username: &str, description: &str, amount: f64, date: Date) -> Result<Self, Error> {
        if username.is_empty() || description.is_empty() {
            return Err(Error::InvalidInput);
        }

        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidInput);
        }

        Ok(Self {
            username: username.to_owned(),
            description: description.to_owned(),
            amount,
            date,
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Save a new expense and return it with its generated ID and timestamps.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let now = OffsetDateTime::now_utc();

    let expense = connection
        .prepare(
            "INSERT INTO expense (username, description, amount, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, username, description, amount, date, created_at, updated_at",
        )?
        .query_row(
            (
                expense.username,
                expense.description,
                expense.amount,
                expense.date,
                now,
                now,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, username, description, amount, date, created_at, updated_at
             FROM expense WHERE id = :id",
        )?
        .query_row(&[(":id", &id.as_i64())], map_expense_row)
        .map_err(|error| error.into())
}

/// Get the total number of expenses in the database.
#[cfg(test)]
pub fn count_expenses(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete an expense by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if no expense has the ID `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id.as_i64()])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT stops the IDs of deleted expenses from being handed out again.
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL CHECK (length(username) > 0),
            description TEXT NOT NULL CHECK (length(description) > 0),
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);
        CREATE INDEX IF NOT EXISTS idx_expense_username_date ON expense(username, date);",
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
///
/// Expects the columns `id, username, description, amount, date, created_at, updated_at`.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: ExpenseId::new(row.get(0)?),
        username: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod new_expense_tests {
    use time::macros::date;

    use crate::Error;

    use super::NewExpense;

    #[test]
    fn new_succeeds_on_valid_input() {
        let expense = NewExpense::new("alice", "coffee", 5.0, date!(2025 - 10 - 05));

        assert!(expense.is_ok());
    }

    #[test]
    fn new_fails_on_empty_username() {
        let expense = NewExpense::new("", "coffee", 5.0, date!(2025 - 10 - 05));

        assert_eq!(expense, Err(Error::InvalidInput));
    }

    #[test]
    fn new_fails_on_empty_description() {
        let expense = NewExpense::new("alice", "", 5.0, date!(2025 - 10 - 05));

        assert_eq!(expense, Err(Error::InvalidInput));
    }

    #[test]
    fn new_accepts_whitespace_only_text() {
        let expense = NewExpense::new(" ", "\n\t \r", 5.0, date!(2025 - 10 - 05));

        assert!(expense.is_ok());
    }

    #[test]
    fn new_fails_on_non_positive_amount() {
        for amount in [0.0, -0.01, -100.0, f64::NAN, f64::INFINITY] {
            let expense = NewExpense::new("alice", "coffee", amount, date!(2025 - 10 - 05));

            assert_eq!(expense, Err(Error::InvalidInput), "amount {amount}");
        }
    }
}


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{Error, db::initialize};

    use super::{
        ExpenseId, NewExpense, count_expenses, create_expense, delete_expense, get_expense,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_expense(username: &str, amount: f64) -> NewExpense {
        NewExpense::new(username, "Test", amount, date!(2025 - 10 - 05)).unwrap()
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let result = create_expense(new_expense("alice", 12.3), &conn);

        match result {
            Ok(expense) => {
                assert_eq!(expense.amount, 12.3);
                assert_eq!(expense.username, "alice");
                assert_eq!(expense.date, date!(2025 - 10 - 05));
                assert_eq!(expense.created_at, expense.updated_at);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn created_expense_can_be_retrieved() {
        let conn = get_test_connection();
        let inserted = create_expense(new_expense("alice", 1.0), &conn).unwrap();

        let selected = get_expense(inserted.id, &conn);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_with_invalid_id_returns_not_found() {
        let conn = get_test_connection();

        let selected = get_expense(ExpenseId::new(999), &conn);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn serializes_to_transport_shape() {
        let conn = get_test_connection();
        let expense = create_expense(new_expense("alice", 5.0), &conn).unwrap();

        let got = serde_json::to_value(&expense).unwrap();

        assert_eq!(got["id"], json!(expense.id.to_string()));
        assert_eq!(got["username"], json!("alice"));
        assert_eq!(got["description"], json!("Test"));
        assert_eq!(got["amount"], json!(5.0));
        assert_eq!(got["date"], json!("2025-10-05"));
        assert!(got["createdAt"].is_string());
        assert!(got["updatedAt"].is_string());
    }

    #[test]
    fn delete_succeeds() {
        let conn = get_test_connection();
        let expense = create_expense(new_expense("alice", 1.0), &conn).unwrap();

        let result = delete_expense(expense.id, &conn);

        assert_eq!(result, Ok(()));
        assert_eq!(get_expense(expense.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_with_invalid_id_returns_error_and_keeps_rows() {
        let conn = get_test_connection();
        create_expense(new_expense("alice", 1.0), &conn).unwrap();

        let result = delete_expense(ExpenseId::new(999999), &conn);

        assert_eq!(result, Err(Error::DeleteMissingExpense));
        assert_eq!(count_expenses(&conn), Ok(1));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let conn = get_test_connection();
        let first = create_expense(new_expense("alice", 1.0), &conn).unwrap();
        delete_expense(first.id, &conn).unwrap();

        let second = create_expense(new_expense("alice", 1.0), &conn).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(
            delete_expense(first.id, &conn),
            Err(Error::DeleteMissingExpense)
        );
    }

    #[test]
    fn table_rejects_non_positive_amounts() {
        let conn = get_test_connection();

        let result = conn.execute(
            "INSERT INTO expense (username, description, amount, date, created_at, updated_at)
             VALUES ('alice', 'coffee', 0, '2025-10-05', '', '')",
            [],
        );

        assert!(result.is_err());
    }
}
