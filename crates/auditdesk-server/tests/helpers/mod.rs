//! Test helpers for AuditDesk server integration tests
//!
//! Every [`TestApp`] owns fresh in-memory stores, so tests are independent
//! and need no database. Password hashing uses a minimal Argon2 cost.

#![allow(dead_code)]

use auditdesk_common::types::{Department, DepartmentSet, Role};
use auditdesk_server::{
    api,
    auth::{PasswordService, TokenService},
    config::{Config, StorageBackend},
    db::{AuditStore, MemoryAuditStore, MemoryUserStore, UserStore},
    features::FeatureState,
    models::User,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub state: FeatureState,
    pub router: Router,
}

/// A seeded account and a valid bearer token for it
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> String {
        self.user.id.to_string()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.storage = StorageBackend::Memory;
        config.auth.jwt_secret = TEST_SECRET.to_string();

        let state = FeatureState {
            audits: Arc::new(MemoryAuditStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            tokens: Arc::new(TokenService::new(TEST_SECRET, "auditdesk", Duration::hours(1))),
            passwords: PasswordService::with_cost(1024, 1, 1).expect("valid argon2 params"),
            departments: Arc::new(DepartmentSet::default()),
        };
        let router = api::create_router(state.clone(), &config);
        Self { state, router }
    }

    pub fn audits(&self) -> &dyn AuditStore {
        self.state.audits.as_ref()
    }

    pub fn users(&self) -> &dyn UserStore {
        self.state.users.as_ref()
    }

    /// Insert an active user with [`TEST_PASSWORD`]
    pub async fn seed_user(&self, email: &str, role: Role, department: &str) -> TestUser {
        let hash = self.state.passwords.hash(TEST_PASSWORD).expect("hash");
        let user = User::new(
            email,
            email.split('@').next().unwrap_or(email),
            hash,
            role,
            Department::from(department),
            Utc::now(),
        );
        self.users().insert(&user).await.expect("insert user");
        let token = self.state.tokens.issue(user.id).expect("issue token");
        TestUser { user, token }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Create an audit through the API and return its id
    pub async fn create_audit(&self, owner: &TestUser, department: &str, items: Value) -> String {
        let (status, body) = self
            .post("/api/v1/audits", &owner.token, audit_payload("Audit", department, items))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn audit_payload(title: &str, department: &str, items: Value) -> Value {
    json!({
        "title": title,
        "description": "Routine audit",
        "audit_type": "internal",
        "department": department,
        "start_date": "2026-02-01T09:00:00Z",
        "items": items,
    })
}

pub fn item(title: &str, status: &str) -> Value {
    json!({ "title": title, "category": "process", "status": status })
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
