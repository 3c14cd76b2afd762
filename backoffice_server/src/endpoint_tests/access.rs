use actix_web::{http::StatusCode, test, test::TestRequest};
use backoffice_engine::db_types::{User, UserProfile};
use chrono::{Duration, Utc};
use serde_json::json;

use super::helpers::*;
use crate::{auth::TokenCodec, config::AuthConfig, server::SECURITY_HEADERS};

fn profile(user: &User) -> UserProfile {
    UserProfile {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn my_user_request(auth_header: Option<String>) -> TestRequest {
    let req = TestRequest::get().uri("/api/my-user");
    match auth_header {
        Some(h) => req.insert_header(("Authorization", h)),
        None => req,
    }
}

#[actix_web::test]
async fn health_is_public() {
    let res = send(TestBackends::default(), TestRequest::get().uri("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "👍️\n");
}

#[actix_web::test]
async fn missing_token() {
    let res = send(TestBackends::default(), my_user_request(None)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, UNAUTHENTICATED_BODY);
}

#[actix_web::test]
async fn every_bad_token_gets_the_same_answer() {
    let user = test_user(1, USER_ROLE_ID);
    let other_codec =
        TokenCodec::new(&AuthConfig::new("some-other-secret", std::time::Duration::from_secs(3600))).unwrap();
    let foreign = other_codec.issue_for_user(&user).unwrap();
    let expired =
        codec().issue_at(user.id, &user.email, user.password_epoch(), Utc::now() - Duration::hours(2)).unwrap();
    let stale = codec().issue(user.id, &user.email, user.password_epoch() - 1).unwrap();
    let unknown_user = codec().issue(99, "ghost@example.com", user.password_epoch()).unwrap();
    let headers = [
        "Bearer".to_string(),
        "Bearer garbage".to_string(),
        "Basic dXNlcjpwYXNz".to_string(),
        format!("Bearer {foreign}"),
        format!("Bearer {expired}"),
        format!("Bearer {stale}"),
        format!("Bearer {unknown_user}"),
    ];
    for header in headers {
        let backends = TestBackends::default().with_caller(&user);
        let res = send(backends, my_user_request(Some(header.clone()))).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{header}");
        assert_eq!(res.body, UNAUTHENTICATED_BODY, "{header}");
    }
}

#[actix_web::test]
async fn current_token_gets_profile() {
    let user = test_user(1, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    let p = profile(&user);
    backends.users.expect_fetch_user_profile().returning(move |_| Ok(Some(p.clone())));
    let (_, auth) = bearer(&user);
    let res = send(backends, my_user_request(Some(auth))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["email"], "user1@example.com");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn token_issued_after_a_password_change_is_accepted() {
    let changed = User { last_password_change: Utc::now(), ..test_user(1, USER_ROLE_ID) };
    let mut backends = TestBackends::default().with_caller(&changed);
    let p = profile(&changed);
    backends.users.expect_fetch_user_profile().returning(move |_| Ok(Some(p.clone())));
    let (_, auth) = bearer(&changed);
    let res = send(backends, my_user_request(Some(auth))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

#[actix_web::test]
async fn capability_is_required() {
    let user = test_user(1, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.users.expect_fetch_all_users().never();
    let res = send(backends, TestRequest::get().uri("/api/users").insert_header(bearer(&user))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body, r#"{"error":"Authentication Error. Insufficient Permissions. Missing capability 'get-users'"}"#);
}

#[actix_web::test]
async fn admin_lists_users() {
    let admin = test_user(1, ADMIN_ROLE_ID);
    let other = test_user(2, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&admin);
    let profiles = vec![profile(&admin), profile(&other)];
    backends.users.expect_fetch_all_users().times(1).returning(move || Ok(profiles.clone()));
    let res = send(backends, TestRequest::get().uri("/api/users").insert_header(bearer(&admin))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["users"][1]["email"], "user2@example.com");
}

#[actix_web::test]
async fn missing_role_is_forbidden() {
    let user = test_user(1, 42);
    let mut backends = TestBackends::default();
    let u = user.clone();
    backends.auth.expect_fetch_user_by_id().returning(move |_| Ok(Some(u.clone())));
    backends.auth.expect_fetch_role_by_id().returning(|_| Ok(None));
    let res = send(backends, my_user_request(Some(bearer(&user).1))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body, r#"{"error":"Authentication Error. Insufficient Permissions. Role not found"}"#);
}

#[actix_web::test]
async fn security_headers_are_always_sent() {
    let user = test_user(1, USER_ROLE_ID);
    let app = test_service(TestBackends::default().with_caller(&user).with_rate_limit(3)).await;
    let requests = [
        TestRequest::get().uri("/health"),
        TestRequest::get().uri("/api/my-user"),
        TestRequest::get().uri("/api/users").insert_header(bearer(&user)),
        TestRequest::get().uri("/api/no-such-route"),
        TestRequest::get().uri("/api/my-user"),
    ];
    let mut statuses = Vec::new();
    for req in requests {
        let res = TestResponse::read(test::call_service(&app, req.to_request()).await).await;
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(res.headers.get(name).and_then(|v| v.to_str().ok()), Some(value), "{name} on {}", res.status);
        }
        statuses.push(res.status.as_u16());
    }
    assert_eq!(statuses, vec![200, 401, 403, 404, 429]);
}

#[actix_web::test]
async fn api_requests_are_rate_limited() {
    let app = test_service(TestBackends::default().with_rate_limit(2)).await;
    let login = || TestRequest::post().uri("/api/login").set_json(json!({"email": "nope", "password": "secret1"}));
    let mut statuses = Vec::new();
    for _ in 0..3 {
        let res = TestResponse::read(test::call_service(&app, login().to_request()).await).await;
        statuses.push(res.status.as_u16());
    }
    assert_eq!(statuses, vec![400, 400, 429]);
    // The health check sits outside the limited scope
    let res = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}
