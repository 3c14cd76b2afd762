use actix_web::{http::StatusCode, test::TestRequest};
use backoffice_engine::db_types::{ApiKey, ApiKeySummary, NewApiKey};
use chrono::Utc;
use serde_json::json;

use super::helpers::*;

#[actix_web::test]
async fn list_own_keys() {
    let user = test_user(3, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.api_keys.expect_fetch_api_keys_for_user().times(1).returning(|user_id| {
        assert_eq!(user_id, 3);
        Ok(vec![ApiKeySummary { id: 1, name: "ci".into(), created_at: Utc::now() }])
    });
    let res = send(backends, TestRequest::get().uri("/api/apikey").insert_header(bearer(&user))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body[0]["name"], "ci");
    assert!(body[0].get("key").is_none());
}

#[actix_web::test]
async fn create_key_returns_the_key_once() {
    let user = test_user(3, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.api_keys.expect_api_key_name_exists().returning(|_, _| Ok(false));
    backends.api_keys.expect_insert_api_key().times(1).returning(|k: NewApiKey| {
        let now = Utc::now();
        Ok(ApiKey { id: 7, name: k.name, key: k.key, user_id: k.user_id, created_at: now, updated_at: now })
    });
    let req = TestRequest::post().uri("/api/apikey").insert_header(bearer(&user)).set_json(json!({"name": " deploy "}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["id"], 7);
    assert_eq!(body["name"], "deploy");
    assert!(!body["key"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn duplicate_key_name() {
    let user = test_user(3, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.api_keys.expect_api_key_name_exists().returning(|_, _| Ok(true));
    backends.api_keys.expect_insert_api_key().never();
    let req = TestRequest::post().uri("/api/apikey").insert_header(bearer(&user)).set_json(json!({"name": "deploy"}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"An API key named 'deploy' already exists"}"#);
}

#[actix_web::test]
async fn delete_needs_an_id() {
    let user = test_user(3, USER_ROLE_ID);
    let backends = TestBackends::default().with_caller(&user);
    let req = TestRequest::delete().uri("/api/apikey").insert_header(bearer(&user)).set_json(json!({}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"API key id is required"}"#);
}

#[actix_web::test]
async fn delete_own_key() {
    let user = test_user(3, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.api_keys.expect_delete_api_key().times(1).returning(|user_id, id| Ok(user_id == 3 && id == 7));
    let req = TestRequest::delete().uri("/api/apikey").insert_header(bearer(&user)).set_json(json!({"id": 7}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json(), json!({"id": 7, "message": "API key deleted"}));
}

#[actix_web::test]
async fn someone_elses_key_is_not_found() {
    let user = test_user(3, USER_ROLE_ID);
    let mut backends = TestBackends::default().with_caller(&user);
    backends.api_keys.expect_delete_api_key().returning(|_, _| Ok(false));
    let req = TestRequest::delete().uri("/api/apikey").insert_header(bearer(&user)).set_json(json!({"id": 8}));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
