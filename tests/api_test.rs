//! Router tests: drive the axum app end to end against the in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_bytes, body_json, build_test_app, catalog_item, category, get, history_record, send,
    FakeStore,
};
use serde_json::json;

fn store() -> FakeStore {
    FakeStore::new()
        .with_categories(vec![
            category("B", "Jackets", Some("A")),
            category("A", "Apparel", None),
            category("C", "Orphan", Some("Z")),
        ])
        .with_items(vec![
            catalog_item("P1", "Denim Jacket", 10.0, 4.0),
            catalog_item("P2", "Leather Boots", 30.0, 2.0),
        ])
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = build_test_app(store());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app(store());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_tree_nests_children_and_promotes_orphans() {
    let app = build_test_app(store());
    let response = get(app, "/api/vendors/V1/categories/tree").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let roots = json["data"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["categoryId"], "A");
    assert_eq!(roots[0]["subCategories"][0]["categoryId"], "B");
    assert_eq!(roots[1]["categoryId"], "C");
}

#[tokio::test]
async fn category_options_are_flattened_pre_order() {
    let app = build_test_app(store());
    let response = get(app, "/api/vendors/V1/categories/options").await;

    let json = body_json(response).await;
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["categoryId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(json["data"][1]["depth"], 1);
}

#[tokio::test]
async fn creating_category_without_name_is_bad_request() {
    let app = build_test_app(store());
    let response = send(
        app,
        Method::POST,
        "/api/vendors/V1/categories",
        Some(json!({ "name": "" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Category name is required.");
}

#[tokio::test]
async fn allocation_preview_distributes_charges() {
    let app = build_test_app(store());
    let body = json!({
        "lines": [
            { "productId": "P1", "name": "Denim Jacket", "quantity": 2, "sellingPrice": 10 },
            { "productId": "P2", "name": "Leather Boots", "quantity": "1", "sellingPrice": "30" }
        ],
        "charges": { "transport": 10, "other": "abc", "tax": 0 }
    });
    let response = send(app, Method::POST, "/api/allocations/preview", Some(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let lines = json["data"]["lines"].as_array().unwrap();
    let t1 = lines[0]["allocatedTransport"].as_f64().unwrap();
    let t2 = lines[1]["allocatedTransport"].as_f64().unwrap();
    assert!((t1 - 4.0).abs() < 1e-9);
    assert!((t2 - 6.0).abs() < 1e-9);
    assert_eq!(lines[0]["size"], "N/A");
    assert!((json["data"]["summary"]["totalCost"].as_f64().unwrap() - 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn allocation_preview_with_zero_prices_drops_charges() {
    let app = build_test_app(store());
    let body = json!({
        "lines": [
            { "productId": "P1", "name": "Free Tote", "quantity": 3, "sellingPrice": 0 }
        ],
        "charges": { "transport": 100 }
    });
    let response = send(app, Method::POST, "/api/allocations/preview", Some(body)).await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["lines"][0]["allocatedTransport"], 0.0);
    assert_eq!(json["data"]["summary"]["unallocatedCharges"], 100.0);
}

#[tokio::test]
async fn batch_lifecycle_from_draft_to_submit() {
    let fake = store();
    let app = build_test_app(fake.clone());

    // create
    let response = send(
        app.clone(),
        Method::POST,
        "/api/batches",
        Some(json!({ "vendorId": "V1", "kind": "stockIn", "warehouseId": "WH1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let number = json["data"]["batch"]["batchNumber"].as_str().unwrap().to_string();
    assert!(number.starts_with("WH1-"));

    // add items
    for id in ["P1", "P2"] {
        let response = send(
            app.clone(),
            Method::POST,
            &format!("/api/batches/{}/items", number),
            Some(json!({ "itemId": id })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // duplicate add is rejected
    let response = send(
        app.clone(),
        Method::POST,
        &format!("/api/batches/{}/items", number),
        Some(json!({ "itemId": "P1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // edit quantity and set charges
    let response = send(
        app.clone(),
        Method::PATCH,
        &format!("/api/batches/{}/items/P1", number),
        Some(json!({ "quantity": "2", "notes": "two in stock room" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        app.clone(),
        Method::PUT,
        &format!("/api/batches/{}/charges", number),
        Some(json!({ "transport": 10, "other": 5, "tax": 0 })),
    )
    .await;
    let json = body_json(response).await;
    let lines = json["data"]["batch"]["lines"].as_array().unwrap();
    assert!((lines[0]["allocatedTransport"].as_f64().unwrap() - 4.0).abs() < 1e-9);
    assert!((lines[1]["allocatedOther"].as_f64().unwrap() - 3.0).abs() < 1e-9);
    assert_eq!(lines[0]["notes"], "two in stock room");

    // suggestions exclude both added items
    let response = get(
        app.clone(),
        &format!("/api/batches/{}/suggestions?q=", number),
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    // csv export
    let response = get(app.clone(), &format!("/api/batches/{}/export.csv", number)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(csv.lines().count(), 4);

    // submit
    let response = send(
        app.clone(),
        Method::POST,
        &format!("/api/batches/{}/submit", number),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Stock In transaction recorded successfully!");
    assert_eq!(json["data"]["stockUpdatesApplied"].as_array().unwrap().len(), 2);

    // the draft is gone
    let response = get(app, &format!("/api/batches/{}", number)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let state = fake.state.lock().unwrap();
    assert_eq!(state.stock_updates.len(), 2);
    assert_eq!(state.transactions.len(), 2);
}

#[tokio::test]
async fn partial_submission_returns_bad_gateway_with_report() {
    let fake = store();
    fake.fail_update_on("P2");
    let app = build_test_app(fake.clone());

    let json = body_json(
        send(
            app.clone(),
            Method::POST,
            "/api/batches",
            Some(json!({ "vendorId": "V1", "kind": "stockOut" })),
        )
        .await,
    )
    .await;
    let number = json["data"]["batch"]["batchNumber"].as_str().unwrap().to_string();
    assert!(number.starts_with("BATCH-"));

    for id in ["P1", "P2"] {
        send(
            app.clone(),
            Method::POST,
            &format!("/api/batches/{}/items", number),
            Some(json!({ "itemId": id })),
        )
        .await;
    }

    let response = send(
        app.clone(),
        Method::POST,
        &format!("/api/batches/{}/submit", number),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["data"]["stockUpdatesApplied"], json!(["P1"]));

    // the draft is still there
    let response = get(app, &format!("/api/batches/{}", number)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn submitting_empty_batch_is_bad_request() {
    let app = build_test_app(store());
    let json = body_json(
        send(
            app.clone(),
            Method::POST,
            "/api/batches",
            Some(json!({ "vendorId": "V1", "kind": "stockOut" })),
        )
        .await,
    )
    .await;
    let number = json["data"]["batch"]["batchNumber"].as_str().unwrap().to_string();

    let response = send(
        app,
        Method::POST,
        &format!("/api/batches/{}/submit", number),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "No items to stock out.");
}

#[tokio::test]
async fn removing_line_from_unknown_batch_is_not_found() {
    let app = build_test_app(store());
    let response = send(app, Method::DELETE, "/api/batches/NOPE/items/P1", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overview_returns_tree_and_items() {
    let app = build_test_app(store());
    let response = get(app, "/api/vendors/V1/overview").await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["categories"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stock_levels_are_classified_against_reorder_level() {
    let fake = store().with_items(vec![
        catalog_item("P1", "Denim Jacket", 10.0, 10.0),
        catalog_item("P2", "Leather Boots", 30.0, 20.0),
        catalog_item("P3", "Silk Scarf", 5.0, 21.0),
    ]);
    let app = build_test_app(fake);
    let response = get(app, "/api/vendors/V1/stock-levels").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let statuses: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["critical", "warning", "healthy"]);
}

#[tokio::test]
async fn transaction_history_supports_search() {
    let fake = store().with_history(vec![
        history_record("1001", "stockIn", None),
        history_record("1002", "stockOut", Some("Torn seam")),
    ]);
    let app = build_test_app(fake);

    let json = body_json(get(app.clone(), "/api/vendors/V1/transactions").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let json = body_json(get(app, "/api/vendors/V1/transactions?q=torn").await).await;
    let found = json["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["transaction_id"], "1002");
    assert_eq!(found[0]["_id"], "oid-1002");
}

#[tokio::test]
async fn export_filename_is_safe_for_odd_warehouse_ids() {
    let app = build_test_app(store());
    let json = body_json(
        send(
            app.clone(),
            Method::POST,
            "/api/batches",
            Some(json!({ "vendorId": "V1", "kind": "stockIn", "warehouseId": "WH\"9\n" })),
        )
        .await,
    )
    .await;
    let number = json["data"]["batch"]["batchNumber"].as_str().unwrap().to_string();
    assert!(number.starts_with("WH9-"));

    let response = get(app, &format!("/api/batches/{}/export.csv", number)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"].to_str().unwrap();
    assert_eq!(disposition, format!("attachment; filename=\"{}.csv\"", number));
}
