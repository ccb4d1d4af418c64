// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use landscape_pro::config::Config;
use landscape_pro::db::FirestoreDb;
use landscape_pro::routes::create_router;
use landscape_pro::services::{
    CalendarApiClient, CalendarService, CompanyService, GoogleAuthClient, JobService,
    ProposalService, SessionService, StorageClient,
};
use landscape_pro::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let storage = StorageClient::new_mock();

    let oauth = GoogleAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    let calendar_service = CalendarService::new(CalendarApiClient::new(), oauth, db.clone());
    let session_service = SessionService::new(db.clone(), calendar_service.clone());
    let job_service = JobService::new(db.clone());
    let proposal_service = ProposalService::new(db.clone());
    let company_service = CompanyService::new(db.clone(), storage);

    let state = Arc::new(AppState {
        config,
        db,
        session_service,
        calendar_service,
        job_service,
        proposal_service,
        company_service,
    });

    (create_router(state.clone()), state)
}

/// Create a session JWT for tests.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    landscape_pro::middleware::auth::create_jwt(uid, signing_key).expect("JWT creation")
}
