//! Cross-service order lifecycle scenarios.
//!
//! These tests require both services running:
//! - orders service on `ORDERS_BASE_URL` (default http://127.0.0.1:5151)
//! - users service on `USERS_BASE_URL` (default http://127.0.0.1:5050)
//!
//! Run with: cargo test -p orderlink-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use orderlink_integration_tests::{orders_base_url, users_base_url};

fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// Test helper: create a user with a unique email and return its document.
async fn create_test_user(client: &Client) -> Value {
    let base_url = users_base_url();
    let email = format!("test-{}@example.com", uuid::Uuid::new_v4());
    let resp = client
        .post(format!("{base_url}/user"))
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "email": email,
            "phone": "555-0100",
            "address": "1 Test Street",
        }))
        .send()
        .await
        .expect("Failed to create test user");

    assert!(resp.status().is_success());
    resp.json().await.expect("Failed to parse user")
}

/// Test helper: post an order for a user, returning the raw response.
async fn post_order(client: &Client, uid: &str) -> reqwest::Response {
    let base_url = users_base_url();
    client
        .post(format!("{base_url}/users/{uid}/order"))
        .json(&json!({ "name": "Widget", "amount": 20.0, "qty": 1 }))
        .send()
        .await
        .expect("Failed to post order")
}

async fn fetch_user(client: &Client, uid: &str) -> Value {
    let base_url = users_base_url();
    let resp = client
        .get(format!("{base_url}/users/{uid}"))
        .send()
        .await
        .expect("Failed to fetch user");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse user")
}

// ============================================================================
// Scenario A: successful create saga
// ============================================================================

#[tokio::test]
#[ignore = "Requires running users and orders services"]
async fn create_order_saga_links_order_to_user() {
    let client = client();
    let user = create_test_user(&client).await;
    let uid = user["id"].as_str().expect("user id");

    let resp = post_order(&client, uid).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let receipt: Value = resp.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["email"], user["email"]);
    let order_id = receipt["orderId"].as_str().expect("order id").to_owned();

    let user = fetch_user(&client, uid).await;
    assert_eq!(user["orders"], json!([order_id]));
}

// ============================================================================
// Scenario B: orders service unreachable
// ============================================================================

#[tokio::test]
#[ignore = "Requires the users service running with ORDERS_BASE_URL pointing at a dead port"]
async fn upstream_outage_is_reported_and_leaves_user_unchanged() {
    let client = client();
    let user = create_test_user(&client).await;
    let uid = user["id"].as_str().expect("user id");

    let resp = post_order(&client, uid).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "upstream_error");

    let user = fetch_user(&client, uid).await;
    assert_eq!(user["orders"], json!([]));
}

// ============================================================================
// Scenario C: bulk delete fan-out
// ============================================================================

#[tokio::test]
#[ignore = "Requires running users and orders services"]
async fn bulk_delete_removes_all_orders_and_reports_count() {
    let client = client();
    let user = create_test_user(&client).await;
    let uid = user["id"].as_str().expect("user id");

    for _ in 0..3 {
        let resp = post_order(&client, uid).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let users_url = users_base_url();
    let resp = client
        .delete(format!("{users_url}/users/{uid}/orders"))
        .send()
        .await
        .expect("Failed to delete orders");
    assert_eq!(resp.status(), StatusCode::OK);

    let report: Value = resp.json().await.expect("Failed to parse report");
    assert_eq!(report, json!({ "success": true, "count": 3 }));

    // The orders service no longer knows any order for this customer.
    let orders_url = orders_base_url();
    let resp = client
        .get(format!("{orders_url}/orders"))
        .query(&[("uid", uid)])
        .send()
        .await
        .expect("Failed to query orders");
    assert_eq!(resp.status(), StatusCode::OK);
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    assert_eq!(orders, json!([]));

    // The back-references are gone too.
    let user = fetch_user(&client, uid).await;
    assert_eq!(user["orders"], json!([]));

    // A second bulk delete finds nothing and still succeeds.
    let resp = client
        .delete(format!("{users_url}/users/{uid}/orders"))
        .send()
        .await
        .expect("Failed to delete orders again");
    assert_eq!(resp.status(), StatusCode::OK);
    let report: Value = resp.json().await.expect("Failed to parse report");
    assert_eq!(report, json!({ "success": true, "count": 0 }));
}

// ============================================================================
// Scenario D: ownership-scoped order lookup
// ============================================================================

#[tokio::test]
#[ignore = "Requires running users and orders services"]
async fn order_lookup_under_the_wrong_customer_is_not_found() {
    let client = client();
    let owner = create_test_user(&client).await;
    let owner_id = owner["id"].as_str().expect("user id");
    let other = create_test_user(&client).await;
    let other_id = other["id"].as_str().expect("user id");

    let resp = post_order(&client, owner_id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: Value = resp.json().await.expect("Failed to parse receipt");
    let order_id = receipt["orderId"].as_str().expect("order id");

    let orders_url = orders_base_url();

    // The owner sees the order.
    let resp = client
        .get(format!("{orders_url}/orders"))
        .query(&[("uid", owner_id), ("oid", order_id)])
        .send()
        .await
        .expect("Failed to query order");
    assert_eq!(resp.status(), StatusCode::OK);

    // Anyone else gets a 404, not the record.
    let resp = client
        .get(format!("{orders_url}/orders"))
        .query(&[("uid", other_id), ("oid", order_id)])
        .send()
        .await
        .expect("Failed to query order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Trace propagation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running users and orders services"]
async fn inbound_traceparent_is_accepted_on_every_endpoint() {
    let client = client();
    let user = create_test_user(&client).await;
    let uid = user["id"].as_str().expect("user id");

    // A well-formed traceparent must never break a request.
    let traceparent = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";
    let users_url = users_base_url();

    let resp = client
        .get(format!("{users_url}/users/{uid}"))
        .header("traceparent", traceparent)
        .send()
        .await
        .expect("Failed to fetch user");
    assert_eq!(resp.status(), StatusCode::OK);

    // A malformed one is ignored, not rejected.
    let resp = client
        .get(format!("{users_url}/users/{uid}"))
        .header("traceparent", "not-a-traceparent")
        .send()
        .await
        .expect("Failed to fetch user");
    assert_eq!(resp.status(), StatusCode::OK);
}
