mod common;

use actix_web::{http::header, test, web};

use common::{test_config, TestApp};

#[actix_web::test]
async fn test_root_banner() {
    let test_app = TestApp::new(Vec::new());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, web::Bytes::from_static(b"Sanchaara API is running"));
}

#[actix_web::test]
async fn test_health_with_key() {
    let test_app = TestApp::new(Vec::new());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["services"]["gemini"]["status"], "ok");
    let details = body["services"]["gemini"]["details"].as_str().unwrap();
    assert!(details.contains("test***3456"));
    assert!(!details.contains("test-key-123456"));
}

#[actix_web::test]
async fn test_health_degraded_without_key() {
    let test_app = TestApp::with_config(test_config(None), Vec::new());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["gemini"]["status"], "error");
}

#[actix_web::test]
async fn test_cors_preflight_allows_any_origin() {
    let test_app = TestApp::new(Vec::new());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/chat")
        .insert_header((header::ORIGIN, "https://sanchaara.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[actix_web::test]
async fn test_unknown_route() {
    let test_app = TestApp::new(Vec::new());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/unknown").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
