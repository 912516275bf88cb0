//! A small REST backend for tracking shared expenses.
//!
//! Expenses record who spent what, how much and when. The API lists, filters
//! and sorts expenses, creates and deletes them, and reports how much each
//! user has spent in total.
//!
//! Every response body is a JSON envelope, see [Envelope].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod expense;
mod logging;
mod not_found;
mod response;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;

pub use app_state::AppState;
pub use expense::{Expense, ExpenseId, UserTotal, UserTotals};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use response::Envelope;
pub use routing::build_router;
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The payload for a new expense was missing a field, had an empty
    /// username or description, a non-positive amount, or a malformed date.
    #[error("invalid input data")]
    InvalidInput,

    /// The query string for listing expenses could not be parsed, e.g. an
    /// unknown sort key.
    #[error("invalid query parameters: {0}")]
    InvalidQuery(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// Convert the error into a JSON envelope response.
    ///
    /// Client errors get a fixed message. Everything else is a server error
    /// and is reported with `message` set to `context` and the error itself
    /// in the `error` field.
    pub(crate) fn into_json_response(self, context: &str) -> Response {
        match self {
            Error::InvalidInput => {
                Envelope::failure("Invalid input data").into_response_with(StatusCode::BAD_REQUEST)
            }
            Error::InvalidQuery(reason) => {
                tracing::debug!("rejected query parameters: {reason}");
                Envelope::failure("Invalid query parameters")
                    .into_response_with(StatusCode::BAD_REQUEST)
            }
            Error::NotFound | Error::DeleteMissingExpense => {
                Envelope::failure("Expense not found").into_response_with(StatusCode::NOT_FOUND)
            }
            error => {
                tracing::error!("{context}: {error}");
                Envelope::failure_with_error(context, &error)
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response("Something went wrong")
    }
}
