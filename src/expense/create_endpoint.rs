//! The endpoint for adding an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{AppState, Envelope, Error, timezone::today_in};

use super::domain::{NewExpense, create_expense};

const ADD_EXPENSE_ERROR: &str = "Error adding expense";

/// The JSON body for creating an expense.
///
/// Every field is optional here so that a missing field is reported as
/// invalid input rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    /// Who spent the money.
    pub username: Option<String>,
    /// What the money was spent on.
    pub description: Option<String>,
    /// How much was spent.
    pub amount: Option<f64>,
    /// The day the money was spent as `YYYY-MM-DD`, defaults to today.
    pub date: Option<String>,
}

impl ExpenseForm {
    /// Validate the form, using `today` if no date was given.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if a required field is missing or empty,
    /// the amount is not positive, or the date is not a valid `YYYY-MM-DD` date.
    fn validate(self, today: impl FnOnce() -> Result<Date, Error>) -> Result<NewExpense, Error> {
        let (Some(username), Some(description), Some(amount)) =
            (self.username, self.description, self.amount)
        else {
            return Err(Error::InvalidInput);
        };

        let date = match self.date.as_deref() {
            None | Some("") => today()?,
            Some(raw_date) => parse_date(raw_date)?,
        };

        NewExpense::new(&username, &description, amount, date)
    }
}

fn parse_date(raw_date: &str) -> Result<Date, Error> {
    Date::parse(raw_date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidInput)
}

/// The state needed for adding an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for saving expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone used to decide the default date.
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for adding an expense, responds with the saved expense.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    form: Result<Json<ExpenseForm>, JsonRejection>,
) -> Response {
    let form = match form {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::debug!("rejected expense payload: {}", rejection.body_text());
            return Error::InvalidInput.into_json_response(ADD_EXPENSE_ERROR);
        }
    };

    let today = || {
        today_in(&state.local_timezone)
            .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))
    };

    let new_expense = match form.validate(today) {
        Ok(new_expense) => new_expense,
        Err(error) => return error.into_json_response(ADD_EXPENSE_ERROR),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(ADD_EXPENSE_ERROR);
        }
    };

    match create_expense(new_expense, &connection) {
        Ok(expense) => Envelope::data(expense).into_response_with(StatusCode::CREATED),
        Err(error) => error.into_json_response(ADD_EXPENSE_ERROR),
    }
}
