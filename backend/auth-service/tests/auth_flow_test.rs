//! End-to-end HTTP tests for the auth service, backed by the in-memory
//! principal store.

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use auth_service::db::memory::InMemoryPrincipalStore;
use auth_service::db::PrincipalStore;
use auth_service::models::AppUser;
use auth_service::routes;
use auth_service::security::password;
use auth_service::services::auth_service::AuthService;
use auth_service::services::user_service::UserService;
use auth_service::AppState;
use token_core::test_utils::sign_claims;
use token_core::{Claims, Role, TokenIssuer, TokenVerifier};

const SECRET: &str = "integration-test-secret";
const API_KEY: &str = "integration-test-api-key";

fn state_with(users: Vec<AppUser>) -> AppState {
    let store: Arc<dyn PrincipalStore> = Arc::new(InMemoryPrincipalStore::with_users(users));
    AppState {
        auth: AuthService::new(
            store.clone(),
            TokenIssuer::new(SECRET).unwrap(),
            API_KEY.to_string(),
        ),
        users: UserService::new(store.clone()),
        verifier: TokenVerifier::new(SECRET).unwrap(),
        store,
    }
}

fn user(email: &str, pw: &str, role: Role, active: bool) -> AppUser {
    AppUser {
        id: uuid::Uuid::new_v4(),
        last_name: "Doe".to_string(),
        first_name: "Jane".to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(pw).unwrap(),
        role,
        active,
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure),
        )
        .await
    };
}

// Middleware rejections surface as service errors under `init_service`;
// render them the way the server would before asserting on the wire shape.
macro_rules! call_json {
    ($app:expr, $req:expr) => {{
        match test::try_call_service(&$app, $req).await {
            Ok(resp) => {
                let status = resp.status();
                let body: Value = test::read_body_json(resp).await;
                (status, body)
            }
            Err(err) => {
                let resp = actix_web::HttpResponse::from_error(err);
                let status = resp.status();
                let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
                (status, serde_json::from_slice(&bytes).unwrap())
            }
        }
    }};
}

#[actix_web::test]
async fn register_then_login_round_trip() {
    let app = app!(state_with(vec![]));

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "lastName": "Doe",
            "firstName": "Jane",
            "email": "a@x.com",
            "password": "longenoughpw"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["role"], "PENDING");

    // Decoded subject equals the registered email.
    let ctx = TokenVerifier::new(SECRET)
        .unwrap()
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(ctx.subject, "a@x.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@x.com", "password": "longenoughpw"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn duplicate_registration_is_400() {
    let app = app!(state_with(vec![user("dup@x.com", "pw123456", Role::User, true)]));

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "lastName": "Doe",
            "firstName": "Jane",
            "email": "dup@x.com",
            "password": "longenoughpw"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "DUPLICATE_IDENTITY");
}

#[actix_web::test]
async fn invalid_email_is_rejected_by_validation() {
    let app = app!(state_with(vec![]));

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "lastName": "Doe",
            "firstName": "Jane",
            "email": "not-an-email",
            "password": "longenoughpw"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn bad_credentials_are_401_disabled_account_is_403() {
    let app = app!(state_with(vec![
        user("a@x.com", "pw123456", Role::User, true),
        user("off@x.com", "pw123456", Role::User, false),
    ]));

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@x.com", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "off@x.com", "password": "pw123456"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "DISABLED_ACCOUNT");
}

#[actix_web::test]
async fn internal_token_endpoint_gates_on_exact_api_key() {
    let app = app!(state_with(vec![]));

    let req = test::TestRequest::post()
        .uri("/internal-auth/internal-token")
        .insert_header(("Internal-Api-Key", API_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let token = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    let ctx = TokenVerifier::new(SECRET).unwrap().verify(&token).unwrap();
    assert_eq!(ctx.subject, "internal-service");
    assert_eq!(ctx.primary_role(), Some("INTERNAL_SERVICE"));

    // Wrong key and missing header both read as invalid.
    let req = test::TestRequest::post()
        .uri("/internal-auth/internal-token")
        .insert_header(("Internal-Api-Key", "INTEGRATION-TEST-API-KEY"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/internal-auth/internal-token")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_routes_require_admin_capability() {
    let admin = user("admin@x.com", "pw123456", Role::Admin, true);
    let plain = user("user@x.com", "pw123456", Role::User, true);
    let app = app!(state_with(vec![admin, plain]));

    let issuer = TokenIssuer::new(SECRET).unwrap();
    let admin_token = issuer.issue_user_token("admin@x.com", Role::Admin).unwrap();
    let user_token = issuer.issue_user_token("user@x.com", Role::User).unwrap();

    // No header at all.
    let req = test::TestRequest::get().uri("/api/users").to_request();
    let (status, body) = call_json!(app, req);
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "MISSING_AUTH_HEADER");

    // Authenticated but not admin.
    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", format!("Bearer {user_token}")))
        .to_request();
    let (status, body) = call_json!(app, req);
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    // Admin sees the list; password hashes are not serialized.
    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", format!("Bearer {admin_token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|u| u.get("passwordHash").is_none()));

    // Promote the pending user.
    let req = test::TestRequest::put()
        .uri("/api/users/user@x.com/role")
        .insert_header(("Authorization", format!("Bearer {admin_token}")))
        .set_json(json!({"role": "ADMIN"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["role"], "ADMIN");
}

#[actix_web::test]
async fn token_for_deactivated_account_is_rejected_by_subject_lookup() {
    // The signature is still valid; only the live lookup catches this.
    let app = app!(state_with(vec![user("off@x.com", "pw123456", Role::Admin, false)]));
    let token = TokenIssuer::new(SECRET)
        .unwrap()
        .issue_user_token("off@x.com", Role::Admin)
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call_json!(app, req);

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "DISABLED_ACCOUNT");
}

#[actix_web::test]
async fn token_for_unknown_subject_is_rejected() {
    let app = app!(state_with(vec![]));
    let token = TokenIssuer::new(SECRET)
        .unwrap()
        .issue_user_token("ghost@x.com", Role::Admin)
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call_json!(app, req);

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNKNOWN_SUBJECT");
}

#[actix_web::test]
async fn expired_token_is_rejected_as_expired() {
    // 25 hours after issuance the 24h credential is dead, signature or not.
    let app = app!(state_with(vec![user("a@x.com", "pw123456", Role::Admin, true)]));

    let issued_at = chrono::Utc::now().timestamp() - 25 * 3600;
    let token = sign_claims(SECRET, &Claims::new("a@x.com", Role::Admin, issued_at));

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call_json!(app, req);

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "EXPIRED_TOKEN");
}
