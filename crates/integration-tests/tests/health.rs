//! Health probes, landing page and response headers.

use axum::http::{StatusCode, header};

use turnstile_integration_tests::{TestApp, body_text};

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let app = TestApp::new().await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn home_page_varies_with_login() {
    let app = TestApp::new().await;

    let anonymous = body_text(app.get("/", None).await).await;
    assert!(anonymous.contains("/register"));

    let cookie = app.member("anna").await;
    let member = body_text(app.get("/", Some(&cookie)).await).await;
    assert!(member.contains("/logout"));
}
