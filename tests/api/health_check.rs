use crate::helpers::TestApp;

#[tokio::test]
async fn health_check_works() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get("/health_check").await;

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length())
}

#[tokio::test]
async fn health_check_carries_cors_headers() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get("/health_check").await;
    let headers = response.headers();

    assert_eq!(headers["Access-Control-Allow-Origin"], "*");
    assert_eq!(headers["Access-Control-Allow-Credentials"], "true");
    assert!(headers.contains_key("Access-Control-Allow-Methods"));
    assert!(headers.contains_key("Access-Control-Allow-Headers"));
}
