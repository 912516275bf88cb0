//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_user_totals_endpoint,
        list_expenses_endpoint,
    },
    not_found::{get_404_not_found, get_405_method_not_allowed},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::EXPENSE, delete(delete_expense_endpoint))
        .route(endpoints::TOTALS, get(get_user_totals_endpoint))
        .fallback(get_404_not_found)
        .method_not_allowed_fallback(get_405_method_not_allowed)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::{HeaderValue, StatusCode, header::ORIGIN};
    use serde_json::json;

    use crate::{endpoints, test_utils::get_test_server};

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nope").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"success": false, "message": "Route not found"}));
    }

    #[tokio::test]
    async fn unsupported_method_returns_json_error() {
        let server = get_test_server();

        let response = server.put(endpoints::TOTALS).await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        response.assert_json(&json!({"success": false, "message": "Method not allowed"}));
    }

    #[tokio::test]
    async fn allows_cross_origin_requests() {
        let server = get_test_server();

        let response = server
            .get(endpoints::EXPENSES)
            .add_header(ORIGIN, HeaderValue::from_static("http://localhost:3000"))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get("access-control-allow-origin"),
            Some(&HeaderValue::from_static("*"))
        );
    }

    /// Walks through adding two expenses, checking the totals, deleting one
    /// and checking the totals again.
    #[tokio::test]
    async fn totals_follow_creates_and_deletes() {
        let server = get_test_server();
        let coffee = server
            .post(endpoints::EXPENSES)
            .json(&json!({"username": "a", "description": "coffee", "amount": 5}))
            .await;
        coffee.assert_status(StatusCode::CREATED);
        let coffee_id = coffee.json::<serde_json::Value>()["data"]["id"]
            .as_str()
            .expect("id should be a string")
            .to_owned();
        server
            .post(endpoints::EXPENSES)
            .json(&json!({"username": "b", "description": "lunch", "amount": 15}))
            .await
            .assert_status(StatusCode::CREATED);

        server.get(endpoints::TOTALS).await.assert_json(&json!({
            "success": true,
            "data": {
                "userTotals": [
                    {"username": "b", "total": 15.0, "count": 1},
                    {"username": "a", "total": 5.0, "count": 1},
                ],
                "totalExpenses": 20.0
            }
        }));

        server
            .delete(&format!("{}/{coffee_id}", endpoints::EXPENSES))
            .await
            .assert_status_ok();

        server.get(endpoints::TOTALS).await.assert_json(&json!({
            "success": true,
            "data": {
                "userTotals": [{"username": "b", "total": 15.0, "count": 1}],
                "totalExpenses": 15.0
            }
        }));
    }
}
