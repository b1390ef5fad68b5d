//! Exercises `CurrentUser` through a real actix service, confirming the
//! RFC 7807 error contract on the unauthenticated paths and successful
//! extraction on a valid bearer token.

use std::sync::Arc;

use actix_web::{test, web, App, HttpResponse};
use backend::auth::claims::Claims;
use backend::auth::jwt::mint_access_token;
use backend::extractors::current_user::CurrentUser;
use backend::state::app_state::AppState;
use backend::state::security_config::SecurityConfig;
use backend::store::memory_store::InMemorySessionStore;
use backend_test_support::problem_details::assert_problem_details_structure;

fn test_state() -> AppState {
    let security = SecurityConfig { jwt_secret: b"test-secret-at-least-16-bytes".to_vec() };
    AppState::new(None, security, Arc::new(InMemorySessionStore::new()))
}

async fn whoami(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "user_id": user.user_id }))
}

#[actix_web::test]
async fn missing_bearer_is_a_401_problem_detail() {
    let state = test_state();
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 401, "UNAUTHORIZED_MISSING_BEARER", "Bearer").await;
}

#[actix_web::test]
async fn invalid_token_is_a_401_problem_detail() {
    let state = test_state();
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get().uri("/whoami").insert_header(("Authorization", "Bearer garbage")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 401, "UNAUTHORIZED_INVALID_TOKEN", "Invalid").await;
}

#[actix_web::test]
async fn valid_token_resolves_user_id() {
    let secret = b"test-secret-at-least-16-bytes";
    let state = AppState::new(None, SecurityConfig { jwt_secret: secret.to_vec() }, Arc::new(InMemorySessionStore::new()));
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).route("/whoami", web::get().to(whoami)),
    )
    .await;

    let claims = Claims { sub: 77, username: "alice".into(), iat: 0, exp: 9_999_999_999 };
    let token = mint_access_token(&claims, secret).unwrap();

    let req = test::TestRequest::get().uri("/whoami").insert_header(("Authorization", format!("Bearer {token}"))).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], 77);
}
