mod common;

use axum::http::StatusCode;
use common::{oid, TestApp, ADMIN_EMAIL};
use serde_json::json;

async fn seed(app: &TestApp) {
    let bills = [
        ("Electricity - January", "Electricity", 1200, "2025-01-05", "Dhaka"),
        ("Water Supply", "Water", 450, "2025-01-10", "Chittagong"),
        ("Gas Line", "Gas", 800, "2025-02-01", "Dhaka"),
        ("Internet Fiber", "Internet", 1500, "2025-02-12", "Sylhet"),
        ("Electricity - February", "Electricity", 1100, "2025-02-05", "Dhaka"),
        ("Water Tanker", "Water", 300, "2025-03-01", "Khulna"),
        ("Mobile Recharge", "Mobile", 200, "2025-03-03", "Dhaka"),
        ("Electricity - March", "Electricity", 1300, "2025-03-05", "Rajshahi"),
        ("Gas Cylinder", "Gas", 1400, "2025-03-09", "Dhaka"),
        ("Internet Copper", "Internet", 900, "2025-03-15", "Barishal"),
    ];
    for (title, category, amount, date, location) in bills {
        let (status, _) = app
            .send(
                "POST",
                "/bills",
                None,
                Some(json!({
                    "title": title,
                    "category": category,
                    "amount": amount,
                    "date": date,
                    "location": location
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_pagination_envelope() {
    let app = TestApp::new().await;
    seed(&app).await;

    let (status, body) = app.send("GET", "/bills?page=2&limit=4", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 10);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 4);

    let (_, body) = app.send("GET", "/bills?page=3&limit=4", None, None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    // Defaults: page 1, limit 8
    let (_, body) = app.send("GET", "/bills?page=abc&limit=0", None, None).await;
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_search_is_case_insensitive_across_fields() {
    let app = TestApp::new().await;
    seed(&app).await;

    let (_, lower) = app.send("GET", "/bills?search=dhaka&limit=100", None, None).await;
    let (_, upper) = app.send("GET", "/bills?search=DHAKA&limit=100", None, None).await;
    assert_eq!(lower["total"], 5);
    assert_eq!(lower["items"], upper["items"]);

    // Matches category as well as title
    let (_, body) = app.send("GET", "/bills?search=inTERnet", None, None).await;
    assert_eq!(body["total"], 2);

    let (_, body) = app.send("GET", "/bills?search=dhaka&category=Gas", None, None).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_price_low_sort_is_non_decreasing() {
    let app = TestApp::new().await;
    seed(&app).await;

    let (_, body) = app.send("GET", "/bills?sort=priceLow&limit=100", None, None).await;
    let amounts: Vec<f64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["amount"].as_f64().unwrap())
        .collect();
    assert_eq!(amounts.len(), 10);
    assert!(amounts.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_insert_then_get_round_trip() {
    let app = TestApp::new().await;
    let payload = json!({
        "title": "Electricity - April",
        "category": "Electricity",
        "amount": 990.5,
        "date": "2025-04-02",
        "location": "Dhaka",
        "organization": "DESCO"
    });
    let (status, created) = app.send("POST", "/bills", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = oid(&created);

    let (status, mut fetched) = app.send("GET", &format!("/bills/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    fetched.as_object_mut().unwrap().remove("_id");
    assert_eq!(fetched, payload);
}

#[tokio::test]
async fn test_round_trip_without_date_or_location() {
    let app = TestApp::new().await;
    let payload = json!({ "title": "Gas", "category": "Gas", "amount": 450.5 });
    let (status, created) = app.send("POST", "/bills", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = oid(&created);

    let (status, mut fetched) = app.send("GET", &format!("/bills/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    fetched.as_object_mut().unwrap().remove("_id");
    assert_eq!(fetched, payload);

    // Still listed and searchable without a location
    let (_, body) = app.send("GET", "/bills?search=gas&sort=dateNew", None, None).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_get_bill_with_malformed_id_is_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/bills/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid id"));

    let (status, body) = app.send("GET", "/bills/65f1c0a2b3c4d5e6f7a8b9c0", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_latest_and_categories() {
    let app = TestApp::new().await;
    seed(&app).await;

    let (_, latest) = app.send("GET", "/bills/latest3", None, None).await;
    let dates: Vec<&str> = latest.as_array().unwrap().iter().map(|b| b["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2025-03-15", "2025-03-09", "2025-03-05"]);

    let (_, latest) = app.send("GET", "/bills/latest6", None, None).await;
    assert_eq!(latest.as_array().unwrap().len(), 6);

    let (_, categories) = app.send("GET", "/bills/categories", None, None).await;
    assert_eq!(categories, json!(["Electricity", "Gas", "Internet", "Mobile", "Water"]));
}

#[tokio::test]
async fn test_catalog_mutation_requires_admin() {
    let app = TestApp::new().await;
    let (_, created) = app
        .send(
            "POST",
            "/bills",
            None,
            Some(json!({"title": "Gas", "category": "Gas", "amount": 10, "date": "2025-01-01", "location": "Dhaka"})),
        )
        .await;
    let uri = format!("/bills/{}", oid(&created));
    let patch = json!({"amount": "25.5", "_id": "ignored"});

    let (status, body) = app.send("PATCH", &uri, None, Some(patch.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = app.send("PATCH", &uri, Some("not-a-token"), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = app.token("someone@smartbills.test");
    let (status, _) = app.send("PATCH", &uri, Some(&user_token), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = app.token(ADMIN_EMAIL);
    let (status, updated) = app.send("PATCH", &uri, Some(&admin_token), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount"], 25.5);

    let (status, _) = app.send("DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_liveness_routes() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Smart bills server is running...");
    let (_, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(body, "OK");
}
