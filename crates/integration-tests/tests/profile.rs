//! Profile page and purchase history.

use axum::http::StatusCode;

use turnstile_integration_tests::{TestApp, body_text, location};

#[tokio::test]
async fn profile_requires_session() {
    let app = TestApp::new().await;

    let response = app.get("/client/edit", None).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn profile_shows_purchase_history() {
    let app = TestApp::new().await;
    let cookie = app.member("anna").await;
    app.post_form("/menu/buy/2", &[], Some(&cookie)).await;

    let response = app.get("/client/edit", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Test Member"));
    assert!(body.contains("Абонемент Молодежный"));
}

#[tokio::test]
async fn profile_update_changes_only_name_and_gender() {
    let app = TestApp::new().await;
    let cookie = app.member("anna").await;

    let response = app
        .post_form(
            "/client/edit",
            &[("name", "Anna Petrova"), ("gender", "other"), ("age", "99")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/client/edit"));

    let (name, gender, age, username): (String, String, i64, String) =
        sqlx::query_as("SELECT name, gender, age, username FROM users")
            .fetch_one(&app.pool)
            .await
            .expect("user row");
    assert_eq!(name, "Anna Petrova");
    assert_eq!(gender, "other");
    assert_eq!(age, 30);
    assert_eq!(username, "anna");
}

#[tokio::test]
async fn profile_of_deleted_user_is_not_found() {
    let app = TestApp::new().await;
    let cookie = app.member("anna").await;

    sqlx::query("DELETE FROM users")
        .execute(&app.pool)
        .await
        .expect("delete user");

    let response = app.get("/client/edit", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_form(
            "/client/edit",
            &[("name", "Anna"), ("gender", "female")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
