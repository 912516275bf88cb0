//! Expense deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Envelope, Error};

use super::domain::{ExpenseId, delete_expense};

const DELETE_EXPENSE_ERROR: &str = "Error deleting expense";

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// The database connection for deleting expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle expense deletion. Responds with a success message or "Expense not found".
///
/// An ID that is not a valid store ID cannot belong to an expense, so it is
/// reported as not found.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    raw_expense_id: Result<Path<String>, PathRejection>,
) -> Response {
    let raw_expense_id = match raw_expense_id {
        Ok(Path(raw_expense_id)) => raw_expense_id,
        Err(rejection) => {
            tracing::debug!("rejected expense ID: {}", rejection.body_text());
            return Error::DeleteMissingExpense.into_json_response(DELETE_EXPENSE_ERROR);
        }
    };

    let Ok(expense_id) = raw_expense_id.parse::<ExpenseId>() else {
        tracing::debug!("tried to delete expense with malformed ID {raw_expense_id:?}");
        return Error::DeleteMissingExpense.into_json_response(DELETE_EXPENSE_ERROR);
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(DELETE_EXPENSE_ERROR);
        }
    };

    match delete_expense(expense_id, &connection) {
        Ok(()) => Envelope::message("Expense deleted").into_response(),
        Err(error) => error.into_json_response(DELETE_EXPENSE_ERROR),
    }
}
