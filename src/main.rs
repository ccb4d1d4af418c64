// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Landscape Pro API Server
//!
//! Backend for the Landscape Pro business management app: proposals and
//! invoices, job scheduling, Google Calendar integration, and company
//! profiles.

use landscape_pro::{
    config::Config,
    db::FirestoreDb,
    services::{
        CalendarApiClient, CalendarService, CompanyService, GoogleAuthClient, JobService,
        ProposalService, SessionService, StorageClient,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Landscape Pro API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.firebase_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize object storage for logo uploads
    let storage = StorageClient::new(&config.firebase_storage_bucket, &config.firebase_api_key);
    tracing::info!(
        bucket = %config.firebase_storage_bucket,
        "Storage client initialized"
    );

    // Google OAuth client shared by sign-in and token refresh
    let oauth = GoogleAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );

    // Service layer, each injected with its storage-client dependency
    let calendar_service = CalendarService::new(CalendarApiClient::new(), oauth, db.clone());
    let session_service = SessionService::new(db.clone(), calendar_service.clone());
    let job_service = JobService::new(db.clone());
    let proposal_service = ProposalService::new(db.clone());
    let company_service = CompanyService::new(db.clone(), storage);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        session_service,
        calendar_service,
        job_service,
        proposal_service,
        company_service,
    });

    // Build router
    let app = landscape_pro::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("landscape_pro=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
