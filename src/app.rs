//! HTTP router assembly.

use crate::{handlers, services::wallet_service::WalletService};
use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the application router around a wallet service.
pub fn router(service: WalletService) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/wallet", post(handlers::wallets::apply_operation))
        .route("/api/v1/wallets/{id}", get(handlers::wallets::get_wallet))
        // Log every request/response pair
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        // Share the service with all handlers via State extraction
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::wallet::BalanceResponse, store::InMemoryBalanceStore};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> Router {
        let service = WalletService::new(
            Arc::new(InMemoryBalanceStore::new()),
            Duration::from_secs(5),
        );
        router(service)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_operation(body: Value) -> Request<Body> {
        Request::post("/api/v1/wallet")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_wallet(id: &str) -> Request<Body> {
        Request::get(format!("/api/v1/wallets/{id}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn deposit_then_read_balance() {
        let app = app();
        let id = Uuid::new_v4();

        let (status, body) = send(
            &app,
            post_operation(json!({"walletId": id, "operationType": "DEPOSIT", "amount": 150})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: BalanceResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            response,
            BalanceResponse {
                wallet_id: id,
                balance: 150
            }
        );

        let (status, body) = send(&app, get_wallet(&id.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], 150);
        assert_eq!(body["walletId"], id.to_string());
    }

    #[tokio::test]
    async fn insufficient_withdrawal_is_conflict() {
        let app = app();
        let id = Uuid::new_v4();
        send(
            &app,
            post_operation(json!({"walletId": id, "operationType": "DEPOSIT", "amount": 50})),
        )
        .await;

        let (status, body) = send(
            &app,
            post_operation(json!({"walletId": id, "operationType": "WITHDRAW", "amount": 100})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "insufficient_funds");

        let (_, body) = send(&app, get_wallet(&id.to_string())).await;
        assert_eq!(body["balance"], 50);
    }

    #[tokio::test]
    async fn unknown_wallet_is_not_found() {
        let app = app();
        let id = Uuid::new_v4();

        let (status, body) = send(
            &app,
            post_operation(json!({"walletId": id, "operationType": "WITHDRAW", "amount": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "wallet_not_found");

        let (status, _) = send(&app, get_wallet(&id.to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_input_is_bad_request() {
        let app = app();
        let id = Uuid::new_v4();

        let bodies = [
            (json!({"walletId": id, "operationType": "DEPOSIT", "amount": 0}), "invalid_amount"),
            (json!({"walletId": id, "operationType": "DEPOSIT", "amount": -5}), "invalid_amount"),
            (json!({"walletId": id, "operationType": "TRANSFER", "amount": 5}), "unknown_operation"),
            (json!({"walletId": "not-a-uuid", "operationType": "DEPOSIT", "amount": 5}), "invalid_request"),
            (json!({"walletId": id, "operationType": "DEPOSIT"}), "invalid_request"),
        ];

        for (body, code) in bodies {
            let (status, response) = send(&app, post_operation(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"]["code"], code);
        }

        let (status, _) = send(&app, get_wallet("not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // None of the rejected requests created the wallet
        let (status, _) = send(&app, get_wallet(&id.to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let app = app();
        let request = Request::post("/api/v1/wallet")
            .body(Body::from(r#"{"walletId":"x"}"#))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn legacy_wallet_key_is_accepted() {
        let app = app();
        let id = Uuid::new_v4();

        let (status, body) = send(
            &app,
            post_operation(json!({"valletId": id, "operationType": "DEPOSIT", "amount": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], 7);
    }

    #[tokio::test]
    async fn health_reports_store() {
        let app = app();
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "connected");
    }
}
