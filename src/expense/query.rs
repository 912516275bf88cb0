//! Filtering and sorting expenses.

use rusqlite::Connection;
use serde::Deserialize;

use crate::Error;

use super::domain::{Expense, map_expense_row};

/// The fields expenses can be sorted by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// The day the money was spent.
    #[default]
    Date,
    /// How much was spent.
    Amount,
    /// Who spent the money.
    Username,
    /// What the money was spent on.
    Description,
    /// When the expense was recorded.
    CreatedAt,
    /// When the expense was last written to.
    UpdatedAt,
}

impl SortKey {
    fn column(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Amount => "amount",
            SortKey::Username => "username",
            SortKey::Description => "description",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }
}

/// The order to sort expenses in a query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

impl SortDirection {
    fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Which expenses to fetch and how to order them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpenseQuery {
    /// Only include expenses by this user, or everyone's if `None`.
    pub username: Option<String>,
    /// The field to sort by.
    pub sort_key: SortKey,
    /// The direction to sort in.
    pub sort_direction: SortDirection,
}

/// Get the expenses matching `query`, in the order it asks for.
///
/// Expenses that compare equal on the sort key are ordered by ID in the same
/// direction, so the order is stable between calls.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query preparation, execution or row
/// mapping fails.
pub fn get_expenses(query: &ExpenseQuery, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let direction = query.sort_direction.keyword();
    let where_clause = match query.username {
        Some(_) => "WHERE username = ?1",
        None => "",
    };

    // The column and direction come from closed enums, never from user input.
    let sql = format!(
        "SELECT id, username, description, amount, date, created_at, updated_at FROM expense \
        {where_clause} \
        ORDER BY {column} {direction}, id {direction}",
        column = query.sort_key.column(),
    );

    let mut statement = connection.prepare(&sql)?;
    let rows = match &query.username {
        Some(username) => statement.query_map([username], map_expense_row)?,
        None => statement.query_map([], map_expense_row)?,
    };

    rows.map(|expense_result| expense_result.map_err(Error::from))
        .collect()
}
