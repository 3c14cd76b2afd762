use actix_web::{http::StatusCode, test::TestRequest};
use backoffice_engine::{
    db_types::{NewUser, User},
    traits::AuthApiError,
};
use chrono::Utc;
use serde_json::json;

use super::helpers::*;

fn login_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/api/login").set_json(json!({"email": email, "password": password}))
}

#[actix_web::test]
async fn register_new_user() {
    let mut backends = TestBackends::default();
    backends.auth.expect_insert_user().times(1).returning(|u: NewUser| {
        assert_ne!(u.password_hash, TEST_PASSWORD);
        assert_eq!(u.role_id, USER_ROLE_ID);
        Ok(User { name: u.name, email: u.email, ..test_user(5, u.role_id) })
    });
    let req = TestRequest::post()
        .uri("/api/register")
        .set_json(json!({"name": "Ann", "email": "Ann@Example.com", "password": TEST_PASSWORD}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.json(), json!({"id": 5, "name": "Ann", "email": "ann@example.com"}));
}

#[actix_web::test]
async fn register_with_taken_email() {
    let mut backends = TestBackends::default();
    backends.auth.expect_insert_user().returning(|_| Err(AuthApiError::EmailAlreadyRegistered));
    let req = TestRequest::post()
        .uri("/api/register")
        .set_json(json!({"name": "Ann", "email": "ann@example.com", "password": TEST_PASSWORD}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body, r#"{"error":"A user with this email address already exists"}"#);
}

#[actix_web::test]
async fn register_with_invalid_fields() {
    for body in [
        json!({"name": "Ann", "email": "ann@example.com", "password": "12345"}),
        json!({"name": "  ", "email": "ann@example.com", "password": TEST_PASSWORD}),
        json!({"name": "Ann", "email": "not-an-email", "password": TEST_PASSWORD}),
        json!({"email": "ann@example.com"}),
    ] {
        let res = send(TestBackends::default(), TestRequest::post().uri("/api/register").set_json(&body)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{body} gave {}", res.body);
    }
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let req = TestRequest::post()
        .uri("/api/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"email\": ");
    let res = send(TestBackends::default(), req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.starts_with(r#"{"error":"Could not read request body"#), "was: {}", res.body);
}

#[actix_web::test]
async fn login_issues_token() {
    let user = test_user(1, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    let u = user.clone();
    backends.auth.expect_fetch_user_by_email().returning(move |_| Ok(Some(u.clone())));
    backends.auth.expect_record_login_attempt().times(1).returning(|_, _| Ok(()));
    let res = send(backends, login_request("USER1@example.com ", TEST_PASSWORD)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["expiresIn"], "1h");
    assert_eq!(body["user"], json!({"id": 1, "name": "User 1", "email": "user1@example.com"}));
    let claims = codec().verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.user_id, 1);
    assert_eq!(claims.email, "user1@example.com");
    assert_eq!(claims.password_change_epoch, user.password_epoch());
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let user = test_user(1, USER_ROLE_ID);
    let mut backends = TestBackends::default();
    backends.auth.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));
    backends.auth.expect_record_login_attempt().times(1).returning(|_, _| Ok(()));
    let res = send(backends, login_request("user1@example.com", "wrong-password")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, r#"{"error":"Authentication Error. Invalid email or password."}"#);
}

#[actix_web::test]
async fn login_with_unknown_email_looks_like_wrong_password() {
    let mut backends = TestBackends::default();
    backends.auth.expect_fetch_user_by_email().returning(|_| Ok(None));
    let res = send(backends, login_request("nobody@example.com", TEST_PASSWORD)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, r#"{"error":"Authentication Error. Invalid email or password."}"#);
}

#[actix_web::test]
async fn login_attempts_are_throttled() {
    let user = User {
        last_login_attempt: Some(Utc::now()),
        ..test_user(1, USER_ROLE_ID)
    };
    let mut backends = TestBackends::default();
    backends.auth.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));
    backends.auth.expect_record_login_attempt().never();
    let res = send(backends, login_request("user1@example.com", TEST_PASSWORD)).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(res.body.contains("Please wait"), "was: {}", res.body);
}

#[actix_web::test]
async fn change_password_returns_a_fresh_token() {
    let user = test_user(1, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.auth.expect_update_password().times(1).returning(|id, hash, _| {
        assert_eq!(id, 1);
        assert!(hash.starts_with("$argon2"));
        Ok(())
    });
    let req = TestRequest::patch()
        .uri("/api/change-password")
        .insert_header(bearer(&user))
        .set_json(json!({"currentPassword": TEST_PASSWORD, "newPassword": "secret2"}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["message"], "Password changed successfully");
    assert_eq!(body["expiresIn"], "1h");
    let claims = codec().verify(body["token"].as_str().unwrap()).unwrap();
    assert!(claims.password_change_epoch > user.password_epoch());
}

#[actix_web::test]
async fn change_password_checks_the_current_one() {
    let user = test_user(1, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.auth.expect_update_password().never();
    let req = TestRequest::patch()
        .uri("/api/change-password")
        .insert_header(bearer(&user))
        .set_json(json!({"currentPassword": "not-my-password", "newPassword": "secret2"}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, r#"{"error":"Authentication Error. The current password is incorrect."}"#);
}

#[actix_web::test]
async fn change_password_needs_a_token() {
    let req = TestRequest::patch()
        .uri("/api/change-password")
        .set_json(json!({"currentPassword": TEST_PASSWORD, "newPassword": "secret2"}));
    let res = send(TestBackends::default(), req).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, UNAUTHENTICATED_BODY);
}
