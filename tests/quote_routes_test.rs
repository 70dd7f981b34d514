mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_charter_quote_premium_three_hours() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/quote/charter")
        .set_json(&json!({ "hours": 3, "vehicle": "premium" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["hourly_rate"], 85.0);
    assert_eq!(body["data"]["service_fee"], 255.0);
    assert_eq!(body["data"]["total"], 285.0);
    assert_eq!(body["data"]["amount_due_now"], 30.0);
}

#[actix_rt::test]
#[serial]
async fn test_charter_quote_defaults_to_standard_vehicle() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/quote/charter")
        .set_json(&json!({ "hours": 2 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["hourly_rate"], 60.0);
    assert_eq!(body["data"]["total"], 150.0);
}

#[actix_rt::test]
#[serial]
async fn test_charter_quote_rejects_zero_hours() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/quote/charter")
        .set_json(&json!({ "hours": 0 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
#[serial]
async fn test_charter_quote_rejects_unknown_vehicle() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/quote/charter")
        .set_json(&json!({ "hours": 2, "vehicle": "limousine" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
