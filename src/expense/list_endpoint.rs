//! The endpoint for listing expenses.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Envelope, Error};

use super::query::{ExpenseQuery, SortDirection, SortKey, get_expenses};

/// The filter value that matches every user.
const ALL_USERS: &str = "all";

const FETCH_EXPENSES_ERROR: &str = "Error fetching expenses";

/// The query string accepted by [list_expenses_endpoint].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesParams {
    /// A username, or "all" for every user.
    pub filter: Option<String>,
    /// The field to sort by, defaults to the date.
    #[serde(default)]
    pub sort_key: SortKey,
    /// The sort direction, defaults to descending.
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl From<ListExpensesParams> for ExpenseQuery {
    fn from(params: ListExpensesParams) -> Self {
        let username = params
            .filter
            .filter(|filter| !filter.is_empty() && filter != ALL_USERS);

        Self {
            username,
            sort_key: params.sort_key,
            sort_direction: params.sort_direction,
        }
    }
}

/// The state needed for listing expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with the expenses selected by the query string.
pub async fn list_expenses_endpoint(
    State(state): State<ListExpensesState>,
    params: Result<Query<ListExpensesParams>, QueryRejection>,
) -> Response {
    let query: ExpenseQuery = match params {
        Ok(Query(params)) => params.into(),
        Err(rejection) => {
            return Error::InvalidQuery(rejection.body_text())
                .into_json_response(FETCH_EXPENSES_ERROR);
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(FETCH_EXPENSES_ERROR);
        }
    };

    match get_expenses(&query, &connection) {
        Ok(expenses) => Envelope::data(expenses).into_response(),
        Err(error) => error.into_json_response(FETCH_EXPENSES_ERROR),
    }
}
