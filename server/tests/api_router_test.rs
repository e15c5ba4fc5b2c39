//! HTTP surface tests: auth gate, permission layers, tenant isolation.
//!
//! Drives the full router with `tower::ServiceExt::oneshot`, no listener.

mod common;

use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use taptab_server::orders;

use common::*;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_json(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn health_needs_no_token() {
    let env = test_env().await;

    let response = test_router(&env.state)
        .oneshot(get("/api/v1/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn login_returns_tokens_and_profile() {
    let env = test_env().await;

    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({ "email": "waiter@taptab.test", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(
        body["refresh_token"]
            .as_str()
            .is_some_and(|t| t.len() >= 32)
    );
    assert_eq!(body["user"]["email"], "waiter@taptab.test");
    assert_eq!(body["user"]["role"], "waiter");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let env = test_env().await;

    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({ "email": "waiter@taptab.test", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let env = test_env().await;

    let response = test_router(&env.state)
        .oneshot(get("/api/v1/products", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = bearer_token(&env.state, &user("waiter"));
    let response = test_router(&env.state)
        .oneshot(get("/api/v1/products", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let env = test_env().await;

    let response = test_router(&env.state)
        .oneshot(get("/api/v1/products", Some("not.a.jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permission_layer_blocks_out_of_role_actions() {
    let env = test_env().await;
    let kitchen_token = bearer_token(&env.state, &user("kitchen"));

    // Kitchen staff can look at orders but never place them
    let response = test_router(&env.state)
        .oneshot(get("/api/v1/orders", Some(&kitchen_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/orders",
            Some(&kitchen_token),
            json!({ "items": [{ "product_id": BURGER_ID, "quantity": 1 }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn order_can_be_placed_over_http() {
    let env = test_env().await;
    let token = bearer_token(&env.state, &user("waiter"));

    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/orders",
            Some(&token),
            json!({
                "table_id": TABLE_1_ID,
                "guest_count": 2,
                "items": [
                    { "product_id": BURGER_ID, "quantity": 2 },
                    {
                        "product_id": COLA_ID,
                        "quantity": 1,
                        "modifiers": [{ "modifier_option_id": EXTRA_ICE_ID }]
                    }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["subtotal"], 28.97);
    assert_eq!(body["total_amount"], 34.19);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn empty_carts_are_rejected_over_http() {
    let env = test_env().await;
    let token = bearer_token(&env.state, &user("waiter"));

    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/orders",
            Some(&token),
            json!({ "table_id": TABLE_1_ID, "items": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn logout_blacklists_the_access_token() {
    let env = test_env().await;

    // Log in for real so the refresh token exists in cache
    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({ "email": "waiter@taptab.test", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token").to_string();

    let response = test_router(&env.state)
        .oneshot(get("/api/v1/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_router(&env.state)
        .oneshot(post_json("/api/v1/auth/logout", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The same token is now dead
    let response = test_router(&env.state)
        .oneshot(get("/api/v1/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_the_token_pair() {
    let env = test_env().await;

    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({ "email": "cashier@taptab.test", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let refresh_token = body["refresh_token"].as_str().expect("refresh").to_string();
    let user_id = body["user"]["id"].as_str().expect("user id").to_string();

    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh_token": &refresh_token, "user_id": &user_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"], refresh_token.as_str());

    // The old refresh token was replaced by the rotation
    let response = test_router(&env.state)
        .oneshot(post_json(
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh_token": &refresh_token, "user_id": &user_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tenants_cannot_read_each_others_orders() {
    let env = test_env().await;
    let waiter = user("waiter");

    let detail = orders::create_order(
        &env.state,
        &waiter,
        taptab_server::db::models::CreateOrderRequest {
            table_id: None,
            customer_name: None,
            guest_count: 1,
            notes: None,
            items: vec![taptab_server::db::models::CreateOrderItemRequest {
                product_id: COLA_ID.to_string(),
                quantity: 1,
                notes: None,
                modifiers: vec![],
            }],
        },
    )
    .await
    .unwrap();

    let outsider_token = bearer_token(&env.state, &other_org_user("waiter"));
    let response = test_router(&env.state)
        .oneshot(get(
            &format!("/api/v1/orders/{}", detail.order.id),
            Some(&outsider_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn tenants_cannot_read_each_others_products() {
    let env = test_env().await;
    let outsider_token = bearer_token(&env.state, &other_org_user("waiter"));

    let response = test_router(&env.state)
        .oneshot(get(
            &format!("/api/v1/products/{BURGER_ID}"),
            Some(&outsider_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
