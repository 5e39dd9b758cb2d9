#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for .oneshot()

use smart_bills_backend::app::app::{create_router, AppServices, Stores};
use smart_bills_backend::config::{AccessConfig, JwtConfig, ReportConfig};
use smart_bills_backend::model::user::Role;
use smart_bills_backend::repository::user_repo::UserRepository;
use smart_bills_backend::util::identity::JwtIdentityVerifier;

pub const ADMIN_EMAIL: &str = "admin@smartbills.test";

pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub verifier: JwtIdentityVerifier,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AccessConfig::default(), ReportConfig::default()).await
    }

    pub async fn with_config(access_config: AccessConfig, report_config: ReportConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_env_filter("debug").with_test_writer().try_init();
        let stores = Stores::memory();
        stores.users.upsert(ADMIN_EMAIL, Some("Admin".to_string()), None).await.unwrap();
        stores.users.update_role(ADMIN_EMAIL, Role::Admin).await.unwrap();

        let verifier = JwtIdentityVerifier::new(JwtConfig::default());
        let services = AppServices::new(stores.clone(), Arc::new(verifier.clone()), &access_config, report_config);
        let router = create_router(&services, Duration::from_secs(5));
        TestApp { router, stores, verifier }
    }

    pub fn token(&self, email: &str) -> String {
        self.verifier.issue_token(email).unwrap()
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap(); // 1 MB limit
        let json = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
        (status, json)
    }
}

pub fn oid(value: &Value) -> String {
    value["_id"]["$oid"].as_str().expect("_id missing").to_string()
}
