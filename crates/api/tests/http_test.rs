//! End-to-end tests driving the router against an in-memory database.

use std::sync::Arc;

use ams_api::{AppState, create_router};
use ams_core::{Role, auth::hash_password};
use ams_db::migration::{Migrator, MigratorTrait};
use ams_db::repositories::{BuildingInput, NewUser};
use ams_db::{BuildingRepository, FlatRepository, UserRepository};
use ams_shared::{JwtConfig, JwtService};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const PASSWORD: &str = "secret-pass";

struct TestApp {
    router: Router,
    db: DatabaseConnection,
}

impl TestApp {
    async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.expect("open database");
        Migrator::up(&db, None).await.expect("run migrations");

        let jwt = JwtService::new(JwtConfig {
            secret: "test-secret-key-for-http-tests".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 7,
        });
        let router = create_router(AppState {
            db: Arc::new(db.clone()),
            jwt_service: Arc::new(jwt),
        });

        Self { router, db }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    async fn user(&self, email: &str, roles: &[Role]) -> Uuid {
        UserRepository::new(self.db.clone())
            .create(NewUser {
                email: email.to_string(),
                password_hash: hash_password(PASSWORD).expect("hash"),
                full_name: email.split('@').next().unwrap_or(email).to_string(),
                phone_number: None,
                roles: roles.to_vec(),
            })
            .await
            .expect("create user")
            .id
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().expect("access token").to_string()
    }

    async fn building(&self, name: &str) -> Uuid {
        BuildingRepository::new(self.db.clone())
            .create(BuildingInput {
                name: name.to_string(),
                address: None,
            })
            .await
            .expect("create building")
            .id
    }

    async fn flat(&self, building_id: Uuid, number: &str, owner: Option<Uuid>) -> Uuid {
        let repo = FlatRepository::new(self.db.clone());
        let flat = repo
            .create(building_id, number, false)
            .await
            .expect("create flat");
        if let Some(owner_id) = owner {
            repo.assign_owner(flat.id, owner_id)
                .await
                .expect("assign owner");
        }
        flat.id
    }

    /// An owner made president of a fresh building, logged in.
    async fn president(&self, email: &str, building: &str) -> (String, Uuid, Uuid) {
        let user_id = self.user(email, &[Role::Owner]).await;
        let building_id = self.building(building).await;
        UserRepository::new(self.db.clone())
            .assign_president(user_id, building_id)
            .await
            .expect("assign president");
        (self.login(email).await, user_id, building_id)
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_then_me() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "New@Example.com",
                "password": "abcdef",
                "confirm_password": "abcdef",
                "full_name": "New Person"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["user"]["roles"], json!(["User"]));

    let token = body["access_token"].as_str().unwrap();
    let (status, me) = app.get("/api/v1/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "new@example.com");
}

#[tokio::test]
async fn test_register_validation_reports_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "abc",
                "confirm_password": "xyz",
                "full_name": "X"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["password"].is_array());
    assert!(body["fields"]["confirm_password"].is_array());
}

#[tokio::test]
async fn test_bad_credentials_and_missing_token() {
    let app = TestApp::new().await;
    app.user("owner@example.com", &[Role::Owner]).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "wrong-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(Method::GET, "/api/v1/buildings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new().await;
    app.user("owner@example.com", &[Role::Owner]).await;
    let (_, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": PASSWORD })),
        )
        .await;
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let (status, _) = app.get("/api/v1/auth/me", &refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, pair) = app
        .send(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(pair["access_token"].is_string());
}

#[tokio::test]
async fn test_president_is_confined_to_own_building() {
    let app = TestApp::new().await;
    let (token, _, own) = app.president("pres@example.com", "Alpha").await;
    let other = app.building("Beta").await;
    app.flat(own, "1A", None).await;

    let (status, flats) = app
        .get(&format!("/api/v1/buildings/{own}/flats"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flats.as_array().unwrap().len(), 1);

    let (status, body) = app
        .get(&format!("/api/v1/buildings/{other}/flats"), &token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, list) = app.get("/api/v1/buildings", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app
        .post("/api/v1/buildings", &token, json!({ "name": "Gamma" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_super_admin_building_crud() {
    let app = TestApp::new().await;
    app.user("admin@example.com", &[Role::SuperAdmin]).await;
    let token = app.login("admin@example.com").await;

    let (status, created) = app
        .post(
            "/api/v1/buildings",
            &token,
            json!({ "name": "Alpha", "address": "1 Lake Road" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post("/api/v1/buildings", &token, json!({ "name": "Alpha" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/buildings/{id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/v1/buildings/{id}"),
            Some(&token),
            Some(json!({ "name": "Alpha Prime" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overpayment_is_rejected_with_remaining_balance() {
    let app = TestApp::new().await;
    let (token, president_id, building) = app.president("pres@example.com", "Alpha").await;
    app.flat(building, "1A", Some(president_id)).await;

    let (status, created) = app
        .post(
            &format!("/api/v1/buildings/{building}/bills"),
            &token,
            json!({ "name": "Lift", "bill_date": "2026-03-01", "total_amount": "500.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["allocations"].as_array().unwrap().len(), 1);
    let bill_id = created["bill"]["id"].as_str().unwrap();

    let payment = |amount: &str| {
        json!({
            "bill_id": bill_id,
            "name": "Lift vendor",
            "payment_date": "2026-03-02",
            "amount": amount
        })
    };
    let (status, _) = app
        .post(
            &format!("/api/v1/buildings/{building}/payments"),
            &token,
            payment("200"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            &format!("/api/v1/buildings/{building}/payments"),
            &token,
            payment("300.01"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["message"].as_str().unwrap().contains("300.00"),
        "{body}"
    );

    let (status, outstanding) = app
        .get(
            &format!("/api/v1/buildings/{building}/outstanding-bills"),
            &token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outstanding[0]["label"], "Lift (Outstanding: 300.00)");
}

#[tokio::test]
async fn test_owner_sees_only_own_tenants() {
    let app = TestApp::new().await;
    let mine = app.user("mine@example.com", &[Role::Owner]).await;
    let theirs = app.user("theirs@example.com", &[Role::Owner]).await;
    let building = app.building("Alpha").await;
    let my_flat = app.flat(building, "1A", Some(mine)).await;
    let their_flat = app.flat(building, "1B", Some(theirs)).await;
    let token = app.login("mine@example.com").await;

    let (status, tenant) = app
        .post(
            &format!("/api/v1/flats/{my_flat}/tenants"),
            &token,
            json!({ "full_name": "Nadia", "phone_number": "01700000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{tenant}");

    let (status, _) = app
        .get(&format!("/api/v1/flats/{their_flat}/tenants"), &token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let tenant_id = tenant["id"].as_str().unwrap();
    let (status, _) = app
        .post(
            &format!("/api/v1/tenants/{tenant_id}/rents"),
            &token,
            json!({ "payment_date": "2026-03-05", "amount": "0" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, rent) = app
        .post(
            &format!("/api/v1/tenants/{tenant_id}/rents"),
            &token,
            json!({ "payment_date": "2026-03-05", "amount": "15000" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, dashboard) = app.get("/api/v1/dashboard/owner", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["rents"][0]["id"], rent["id"]);

    let other_token = app.login("theirs@example.com").await;
    let rent_id = rent["id"].as_str().unwrap();
    let (status, _) = app
        .get(&format!("/api/v1/rents/{rent_id}"), &other_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_entry_logs_are_building_scoped() {
    let app = TestApp::new().await;
    let (token, _, building) = app.president("pres@example.com", "Alpha").await;
    let other = app.building("Beta").await;
    let flat = app.flat(building, "1A", None).await;
    let other_flat = app.flat(other, "1A", None).await;

    let entry = |building_id: Uuid, flat_id: Uuid, at: &str| {
        json!({
            "building_id": building_id,
            "flat_id": flat_id,
            "visitor_name": "Karim",
            "entry_type": "Delivery",
            "number_of_persons": 1,
            "purpose": "Parcel",
            "entry_time": at
        })
    };
    let past = "2026-01-01T10:00:00Z";

    let (status, body) = app
        .post("/api/v1/entry-logs", &token, entry(building, flat, past))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _) = app
        .post("/api/v1/entry-logs", &token, entry(other, other_flat, past))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/api/v1/entry-logs", &token, entry(building, other_flat, past))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/entry-logs",
            &token,
            entry(building, flat, "2999-01-01T00:00:00Z"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) = app
        .get("/api/v1/entry-logs?page=1&per_page=10", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["flat_number"], "1A");
}

#[tokio::test]
async fn test_admin_creates_president_with_owner_role() {
    let app = TestApp::new().await;
    app.user("admin@example.com", &[Role::SuperAdmin]).await;
    let token = app.login("admin@example.com").await;

    let (status, created) = app
        .post(
            "/api/v1/admin/users",
            &token,
            json!({
                "email": "pres@example.com",
                "password": "abcdef",
                "full_name": "Pres",
                "role": "President"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["roles"], json!(["President", "Owner"]));

    let (status, _) = app
        .post(
            "/api/v1/admin/users",
            &token,
            json!({
                "email": "boss@example.com",
                "password": "abcdef",
                "full_name": "Boss",
                "role": "SuperAdmin"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let pending = app.user("pending@example.com", &[Role::User]).await;
    let (status, list) = app.get("/api/v1/admin/pending-owners", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, approved) = app
        .post(
            &format!("/api/v1/admin/users/{pending}/approve-owner"),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["roles"], json!(["Owner", "User"]));

    let (status, dashboard) = app.get("/api/v1/dashboard/super-admin", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["counts"]["owners"], 2);
    assert_eq!(dashboard["counts"]["pending_approvals"], 0);
}

#[tokio::test]
async fn test_sub_cent_amounts_and_blank_names_are_rejected() {
    let app = TestApp::new().await;
    let (token, president_id, building) = app.president("pres@example.com", "Alpha").await;
    let flat = app.flat(building, "1A", Some(president_id)).await;
    let bills = format!("/api/v1/buildings/{building}/bills");

    let (status, body) = app
        .post(
            &bills,
            &token,
            json!({ "name": "Lift", "bill_date": "2026-03-01", "total_amount": "100.005" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["total_amount"].is_array(), "{body}");

    let (status, body) = app
        .post(
            &bills,
            &token,
            json!({ "name": "   ", "bill_date": "2026-03-01", "total_amount": "100.50" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["name"],
        json!(["This field cannot be blank"])
    );

    let (status, bills_list) = app.get("/api/v1/bills", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(bills_list.as_array().unwrap().is_empty());

    let (status, body) = app
        .post(
            &format!("/api/v1/flats/{flat}/tenants"),
            &token,
            json!({ "full_name": "Nadia", "phone_number": " \t " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["phone_number"].is_array(), "{body}");

    let (status, body) = app
        .post(
            "/api/v1/entry-logs",
            &token,
            json!({
                "building_id": building,
                "flat_id": flat,
                "visitor_name": "  ",
                "entry_type": "Visitor",
                "number_of_persons": 1,
                "purpose": "Guest",
                "entry_time": "2026-01-01T10:00:00Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["visitor_name"].is_array(), "{body}");

    let (status, created) = app
        .post(
            &bills,
            &token,
            json!({ "name": "  Lift  ", "bill_date": "2026-03-01", "total_amount": "100.50" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["bill"]["name"], "Lift");
}
