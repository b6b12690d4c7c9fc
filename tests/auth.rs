mod common;

use reqwest::StatusCode;
use serde_json::json;

use common::{http_client, register_and_login, spawn_app};

#[tokio::test]
async fn test_register_user() {
    let app = spawn_app().await;
    let client = http_client();

    let payload = json!({
        "username": "johndoe",
        "email": "johndoe@example.com",
        "password": "password123",
    });

    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse register response JSON");
    assert!(body["id"].is_number());
    assert_eq!(body["username"].as_str(), Some("johndoe"));
    assert_eq!(body["email"].as_str(), Some("johndoe@example.com"));
    assert_eq!(body["role"].as_str(), Some("user"));
    assert_eq!(body["message"].as_str(), Some("User registered successfully"));
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = spawn_app().await;
    let client = http_client();

    let payload = json!({
        "username": "taken",
        "email": "first@example.com",
        "password": "password123",
    });
    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    //Same username, different email.
    let payload = json!({
        "username": "taken",
        "email": "second@example.com",
        "password": "password123",
    });
    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse conflict response JSON");
    assert_eq!(
        body["type"].as_str(),
        Some("https://api.example.com/problems/user-already-exists-problem-detail")
    );
    assert_eq!(body["status"].as_u64(), Some(409));
    assert!(body["detail"]
        .as_str()
        .expect("detail missing")
        .contains("taken"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_register_username_check_wins_over_email() {
    let app = spawn_app().await;
    let client = http_client();

    let payload = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "password123",
    });
    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    //Both the username and the email collide; the username check must win.
    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse conflict response JSON");
    let detail = body["detail"].as_str().expect("detail missing");
    assert!(detail.starts_with("Username already exists"));
    assert!(detail.contains("alice"));
}

#[tokio::test]
async fn test_register_invalid_email_is_rejected() {
    let app = spawn_app().await;
    let client = http_client();

    let payload = json!({
        "username": "bob",
        "email": "not-an-email",
        "password": "password123",
    });

    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse validation response JSON");
    assert_eq!(
        body["type"].as_str(),
        Some("https://api.example.com/problems/validation-failure-problem-detail")
    );
    let violations = body["violations"]
        .as_array()
        .expect("violations missing from validation problem");
    assert!(violations
        .iter()
        .any(|violation| violation["propertyPath"].as_str() == Some("email")));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = spawn_app().await;
    let client = http_client();

    let payload = json!({
        "username": "carol",
        "email": "carol@example.com",
        "password": "password123",
    });
    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let login_payload = json!({
        "username": "carol",
        "password": "wrong-password",
    });
    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&login_payload)
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login failure JSON");
    assert_eq!(body["detail"].as_str(), Some("Invalid username or password"));
}

#[tokio::test]
async fn test_login_with_unknown_username_is_indistinguishable() {
    let app = spawn_app().await;
    let client = http_client();

    let login_payload = json!({
        "username": "nobody",
        "password": "password123",
    });
    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&login_payload)
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login failure JSON");
    //Same detail as a wrong password, so usernames cannot be enumerated.
    assert_eq!(body["detail"].as_str(), Some("Invalid username or password"));
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = spawn_app().await;
    let client = http_client();

    let response = client
        .get(format!("{}/api/auth/me", app.address))
        .send()
        .await
        .expect("Failed to send me request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile_after_login() {
    let app = spawn_app().await;
    let client = http_client();

    register_and_login(&client, &app.address, "dave").await;

    let response = client
        .get(format!("{}/api/auth/me", app.address))
        .send()
        .await
        .expect("Failed to send me request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse me response JSON");
    assert_eq!(body["username"].as_str(), Some("dave"));
    assert_eq!(body["email"].as_str(), Some("dave@example.com"));
    assert_eq!(body["message"].as_str(), Some("User retrieved successfully"));
}
