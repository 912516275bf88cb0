//! Per-user spending totals.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Envelope, Error};

/// How much one user has spent across all of their expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTotal {
    /// The user the total is for.
    pub username: String,
    /// The sum of the user's expense amounts.
    pub total: f64,
    /// The number of expenses the user has.
    pub count: u32,
}

/// The response body for the totals endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTotals {
    /// Totals for each user, largest total first.
    pub user_totals: Vec<UserTotal>,
    /// The sum of every user's total.
    pub total_expenses: f64,
}

impl UserTotals {
    fn new(user_totals: Vec<UserTotal>) -> Self {
        let total_expenses = user_totals.iter().map(|user_total| user_total.total).sum();

        Self {
            user_totals,
            total_expenses,
        }
    }
}

/// The state needed for the totals endpoint.
#[derive(Debug, Clone)]
pub struct UserTotalsState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserTotalsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

const FETCH_TOTALS_ERROR: &str = "Error fetching user totals";

/// A route handler that responds with the total amount spent by each user.
pub async fn get_user_totals_endpoint(State(state): State<UserTotalsState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(FETCH_TOTALS_ERROR);
        }
    };

    match get_user_totals(&connection) {
        Ok(user_totals) => Envelope::data(UserTotals::new(user_totals)).into_response(),
        Err(error) => error.into_json_response(FETCH_TOTALS_ERROR),
    }
}

/// Sum the amounts and count the expenses of each user.
///
/// Users are ordered by total, largest first. Users with the same total are
/// ordered by name.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_user_totals(connection: &Connection) -> Result<Vec<UserTotal>, Error> {
    connection
        .prepare(
            "SELECT username, SUM(amount) AS total, COUNT(id) AS count FROM expense \
            GROUP BY username \
            ORDER BY total DESC, username ASC",
        )?
        .query_map([], |row| {
            Ok(UserTotal {
                username: row.get(0)?,
                total: row.get(1)?,
                count: row.get(2)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}
