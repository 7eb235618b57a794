use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use warden_api::app::{self, services::AppServices};
use warden_auth::{Hs256JwtValidator, JwtClaims, TokenType};
use warden_core::UserId;
use warden_infra::{seed, Stores};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    admin: UserId,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let stores = Stores::in_memory();
        let report = seed::seed_defaults(&stores, Some("admin@example.com"))
            .await
            .expect("seeding failed");
        let admin = report.admin.expect("admin user missing").id;

        // Same router as prod, in-memory stores, ephemeral port.
        let services = Arc::new(AppServices::new(stores));
        let app = app::router(services, Arc::new(Hs256JwtValidator::new(SECRET)))
            .expect("router should build");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            admin,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, user: UserId, token_type: TokenType, ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        token_type,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn access_token(user: UserId) -> String {
    mint_jwt(SECRET, user, TokenType::Access, ChronoDuration::minutes(10))
}

async fn send_json(req: reqwest::RequestBuilder, expected: StatusCode) -> Value {
    let res = req.send().await.unwrap();
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    assert_eq!(status, expected, "unexpected status, body: {body}");
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap()
    }
}

/// Create a user whose role has a `user` permission row with every right off,
/// so only self-access can let them in.
async fn member_user(srv: &TestServer, client: &reqwest::Client, email: &str) -> String {
    let token = access_token(srv.admin);
    let role = send_json(
        client
            .post(srv.url("/role"))
            .bearer_auth(&token)
            .json(&json!({ "name": "member", "score": 0 })),
        StatusCode::CREATED,
    )
    .await;
    let role_id = role["id"].as_str().unwrap().to_string();

    let modules = send_json(
        client
            .post(srv.url("/module/all"))
            .bearer_auth(&token)
            .json(&json!([{ "fields": ["name"], "condition": "==", "values": ["user"] }])),
        StatusCode::OK,
    )
    .await;
    let module_id = modules["results"][0]["id"].as_str().unwrap().to_string();

    send_json(
        client.post(srv.url("/permission")).bearer_auth(&token).json(&json!({
            "view": false, "add": false, "edit": false, "delete": false, "mask": false,
            "roleId": role_id, "moduleId": module_id, "status": 1
        })),
        StatusCode::CREATED,
    )
    .await;

    let user = send_json(
        client
            .post(srv.url("/users"))
            .bearer_auth(&token)
            .json(&json!({ "name": "Plain", "email": email, "roleId": role_id })),
        StatusCode::CREATED,
    )
    .await;
    user["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tokens_must_be_live_access_tokens_for_known_users() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cases = [
        mint_jwt(SECRET, UserId::new(), TokenType::Access, ChronoDuration::minutes(10)),
        mint_jwt(SECRET, srv.admin, TokenType::Refresh, ChronoDuration::minutes(10)),
        mint_jwt("other-secret", srv.admin, TokenType::Access, ChronoDuration::minutes(10)),
    ];
    for token in cases {
        let res = client
            .get(srv.url("/whoami"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn whoami_reports_principal() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = send_json(
        client.get(srv.url("/whoami")).bearer_auth(access_token(srv.admin)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["userId"].as_str().unwrap(), srv.admin.to_string());
    assert!(body["roleId"].is_string());
}

#[tokio::test]
async fn developer_manages_rbac_graph() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = access_token(srv.admin);

    let role = send_json(
        client
            .post(srv.url("/role"))
            .bearer_auth(&token)
            .json(&json!({ "name": "Auditor", "score": 3 })),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(role["name"], "auditor");
    let role_id = role["id"].as_str().unwrap().to_string();

    let module = send_json(
        client
            .post(srv.url("/module"))
            .bearer_auth(&token)
            .json(&json!({ "name": "Reports" })),
        StatusCode::CREATED,
    )
    .await;
    let module_id = module["id"].as_str().unwrap().to_string();

    let permission = send_json(
        client.post(srv.url("/permission")).bearer_auth(&token).json(&json!({
            "view": true, "add": false, "edit": false, "delete": false, "mask": false,
            "roleId": role_id, "moduleId": module_id, "status": 1
        })),
        StatusCode::CREATED,
    )
    .await;
    let permission_id = permission["id"].as_str().unwrap().to_string();

    // Same (role, module) pair twice.
    send_json(
        client.post(srv.url("/permission")).bearer_auth(&token).json(&json!({
            "view": true, "add": true, "edit": false, "delete": false, "mask": false,
            "roleId": role_id, "moduleId": module_id, "status": 1
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let updated = send_json(
        client
            .put(srv.url(&format!("/role/{role_id}")))
            .bearer_auth(&token)
            .json(&json!({ "name": "auditor", "score": 7 })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["score"], 7);

    // Role is still referenced by the permission.
    send_json(
        client.delete(srv.url(&format!("/role/{role_id}"))).bearer_auth(&token),
        StatusCode::BAD_REQUEST,
    )
    .await;

    send_json(
        client
            .delete(srv.url(&format!("/permission/{permission_id}")))
            .bearer_auth(&token),
        StatusCode::NO_CONTENT,
    )
    .await;
    send_json(
        client.delete(srv.url(&format!("/role/{role_id}"))).bearer_auth(&token),
        StatusCode::NO_CONTENT,
    )
    .await;
    send_json(
        client.get(srv.url(&format!("/role/{role_id}"))).bearer_auth(&token),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn app_info_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = access_token(srv.admin);

    let created = send_json(
        client
            .post(srv.url("/appInfo"))
            .bearer_auth(&token)
            .json(&json!({ "os": "android", "version": "1.2.0", "update_type": 1 })),
        StatusCode::CREATED,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["update_type"], 1);

    let fetched = send_json(
        client.get(srv.url(&format!("/appInfo/{id}"))).bearer_auth(&token),
        StatusCode::OK,
    )
    .await;
    assert_eq!(fetched["version"], "1.2.0");

    send_json(
        client.delete(srv.url(&format!("/appInfo/{id}"))).bearer_auth(&token),
        StatusCode::NO_CONTENT,
    )
    .await;
    send_json(
        client.get(srv.url(&format!("/appInfo/{id}"))).bearer_auth(&token),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn list_filters_and_pages() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = access_token(srv.admin);

    // Seeded modules: appinfo, user, module, permission, role.
    let body = send_json(
        client
            .post(srv.url("/module/all?sortBy=name:asc&limit=2&page=1"))
            .bearer_auth(&token),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["paging"]["totalResults"], 5);
    assert_eq!(body["paging"]["totalPages"], 3);
    assert_eq!(body["paging"]["limit"], 2);
    let names: Vec<_> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["appinfo", "module"]);

    let body = send_json(
        client
            .post(srv.url("/module/all"))
            .bearer_auth(&token)
            .json(&json!([{ "fields": ["name"], "condition": "%=%", "values": ["MOD", "ROLE"] }])),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["paging"]["totalResults"], 2);

    let too_many: Vec<Value> = (0..21)
        .map(|_| json!({ "fields": ["name"], "condition": "==", "values": ["x"] }))
        .collect();
    send_json(
        client
            .post(srv.url("/module/all"))
            .bearer_auth(&token)
            .json(&too_many),
        StatusCode::BAD_REQUEST,
    )
    .await;

    send_json(
        client
            .post(srv.url("/users/all"))
            .bearer_auth(&token)
            .json(&json!([{ "fields": ["password"], "condition": "==", "values": ["x"] }])),
        StatusCode::BAD_REQUEST,
    )
    .await;

    // A trailing lone backslash is not a valid pattern on any backend.
    send_json(
        client
            .post(srv.url("/module/all"))
            .bearer_auth(&token)
            .json(&json!([{ "fields": ["name"], "condition": "%=", "values": ["abc\\"] }])),
        StatusCode::BAD_REQUEST,
    )
    .await;

    send_json(
        client
            .post(srv.url("/module/all?limit=0"))
            .bearer_auth(&token),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn member_can_only_reach_themselves() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let plain_id = member_user(&srv, &client, "plain@example.com").await;
    let plain: UserId = plain_id.parse().unwrap();
    let token = access_token(plain);

    let me = send_json(
        client.get(srv.url(&format!("/users/{plain_id}"))).bearer_auth(&token),
        StatusCode::OK,
    )
    .await;
    assert_eq!(me["email"], "plain@example.com");

    send_json(
        client
            .get(srv.url(&format!("/users/{}", srv.admin)))
            .bearer_auth(&token),
        StatusCode::FORBIDDEN,
    )
    .await;
    send_json(
        client.post(srv.url("/users/all")).bearer_auth(&token),
        StatusCode::FORBIDDEN,
    )
    .await;
    send_json(
        client
            .post(srv.url("/module"))
            .bearer_auth(&token)
            .json(&json!({ "name": "sneaky" })),
        StatusCode::FORBIDDEN,
    )
    .await;

    let renamed = send_json(
        client
            .put(srv.url(&format!("/users/{plain_id}")))
            .bearer_auth(&token)
            .json(&json!({ "name": "Renamed" })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(renamed["name"], "Renamed");

    // Self-access does not extend to picking a new role.
    let whoami = send_json(
        client.get(srv.url("/whoami")).bearer_auth(access_token(srv.admin)),
        StatusCode::OK,
    )
    .await;
    send_json(
        client
            .put(srv.url(&format!("/users/{plain_id}")))
            .bearer_auth(&token)
            .json(&json!({ "roleId": whoami["roleId"] })),
        StatusCode::FORBIDDEN,
    )
    .await;

    // Nor to marking their own email as verified.
    send_json(
        client
            .put(srv.url(&format!("/users/{plain_id}")))
            .bearer_auth(&token)
            .json(&json!({ "isEmailVerified": true })),
        StatusCode::FORBIDDEN,
    )
    .await;
    let me = send_json(
        client.get(srv.url(&format!("/users/{plain_id}"))).bearer_auth(&token),
        StatusCode::OK,
    )
    .await;
    assert_eq!(me["isEmailVerified"], false);

    // Restating the current value is not a change.
    send_json(
        client
            .put(srv.url(&format!("/users/{plain_id}")))
            .bearer_auth(&token)
            .json(&json!({ "isEmailVerified": false })),
        StatusCode::OK,
    )
    .await;
}

#[tokio::test]
async fn write_validation_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = access_token(srv.admin);

    // Seeded module, compared case-insensitively.
    send_json(
        client
            .post(srv.url("/module"))
            .bearer_auth(&token)
            .json(&json!({ "name": "USER" })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let modules = send_json(
        client.post(srv.url("/module/all")).bearer_auth(&token),
        StatusCode::OK,
    )
    .await;
    let module_id = modules["results"][0]["id"].as_str().unwrap().to_string();
    send_json(
        client.post(srv.url("/permission")).bearer_auth(&token).json(&json!({
            "view": true, "add": false, "edit": false, "delete": false, "mask": false,
            "roleId": UserId::new().to_string(), "moduleId": module_id, "status": 1
        })),
        StatusCode::NOT_FOUND,
    )
    .await;

    send_json(
        client
            .post(srv.url("/users"))
            .bearer_auth(&token)
            .json(&json!({ "name": "Eve", "email": "not-an-email" })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    send_json(
        client
            .put(srv.url(&format!("/users/{}", srv.admin)))
            .bearer_auth(&token)
            .json(&json!({})),
        StatusCode::BAD_REQUEST,
    )
    .await;

    send_json(
        client.get(srv.url("/role/not-a-uuid")).bearer_auth(&token),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn deleted_user_loses_access() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let plain_id = member_user(&srv, &client, "gone@example.com").await;
    let token = access_token(plain_id.parse().unwrap());

    send_json(
        client.delete(srv.url(&format!("/users/{plain_id}"))).bearer_auth(&token),
        StatusCode::NO_CONTENT,
    )
    .await;

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_role_delete_never_orphans_permissions() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = access_token(srv.admin);

    let module = send_json(
        client
            .post(srv.url("/module"))
            .bearer_auth(&token)
            .json(&json!({ "name": "reports" })),
        StatusCode::CREATED,
    )
    .await;
    let module_id = module["id"].as_str().unwrap().to_string();

    for round in 0..100 {
        let role = send_json(
            client
                .post(srv.url("/role"))
                .bearer_auth(&token)
                .json(&json!({ "name": format!("temp-{round}"), "score": 0 })),
            StatusCode::CREATED,
        )
        .await;
        let role_id = role["id"].as_str().unwrap().to_string();

        let delete = client
            .delete(srv.url(&format!("/role/{role_id}")))
            .bearer_auth(&token)
            .send();
        let create = client
            .post(srv.url("/permission"))
            .bearer_auth(&token)
            .json(&json!({
                "view": true, "add": false, "edit": false, "delete": false, "mask": false,
                "roleId": role_id, "moduleId": module_id, "status": 1
            }))
            .send();
        let (delete, create) = tokio::join!(delete, create);
        let (delete, create) = (delete.unwrap().status(), create.unwrap().status());

        assert!(
            !(delete == StatusCode::NO_CONTENT && create == StatusCode::CREATED),
            "round {round}: role deleted while a permission was created for it"
        );
        if create == StatusCode::CREATED {
            assert_eq!(delete, StatusCode::BAD_REQUEST);
        } else {
            assert_eq!(create, StatusCode::NOT_FOUND);
        }
    }

    // Every stored permission still points at a live role.
    let permissions = send_json(
        client
            .post(srv.url("/permission/all?limit=1000"))
            .bearer_auth(&token),
        StatusCode::OK,
    )
    .await;
    for permission in permissions["results"].as_array().unwrap() {
        let role_id = permission["roleId"].as_str().unwrap();
        send_json(
            client.get(srv.url(&format!("/role/{role_id}"))).bearer_auth(&token),
            StatusCode::OK,
        )
        .await;
    }
}
