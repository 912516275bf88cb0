//! Helpers shared by the endpoint tests.

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{AppState, build_router};

/// An [AppState] backed by a fresh in-memory database.
pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "Etc/UTC").expect("Could not create app state")
}

/// A test server running the full router on a fresh in-memory database.
pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_state())).expect("Could not create test server.")
}

/// A test server whose database has lost its expense table, so every store
/// call fails.
pub(crate) fn get_broken_test_server() -> TestServer {
    let state = get_test_state();
    state
        .db_connection
        .lock()
        .expect("Could not lock database")
        .execute("DROP TABLE expense", [])
        .expect("Could not drop expense table");

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// Assert that `response` is a 500 envelope with `message` and an `error`.
pub(crate) fn assert_store_failure(response: &TestResponse, message: &str) {
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!(message));
    assert!(body["error"].is_string(), "got body {body}");
}
