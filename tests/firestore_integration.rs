// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Round-trip tests against the Firestore emulator.
//!
//! Skipped unless FIRESTORE_EMULATOR_HOST is set.

use chrono::TimeZone;
use landscape_pro::error::AppError;
use landscape_pro::models::{JobPriority, JobStatus};
use landscape_pro::services::jobs::{CreateJobData, JobFilter};
use landscape_pro::services::JobService;

mod common;

fn job_data(title: &str) -> CreateJobData {
    CreateJobData {
        title: title.to_string(),
        description: Some("Weekly maintenance".to_string()),
        start: chrono::Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap(),
        end: chrono::Utc.with_ymd_and_hms(2026, 4, 1, 17, 0, 0).unwrap(),
        location: Some("12 Elm St".to_string()),
        client: Some("Dana Smith".to_string()),
        status: JobStatus::Scheduled,
        priority: JobPriority::High,
        assigned_to: None,
        notes: None,
    }
}

#[tokio::test]
async fn test_job_create_read_round_trip() {
    require_emulator!();

    let db = common::test_db().await;
    let service = JobService::new(db);
    let uid = format!("roundtrip-{}", uuid::Uuid::new_v4());

    let created = service
        .create_job(&uid, job_data("Round trip job"))
        .await
        .expect("create");

    let jobs = service
        .get_jobs(&uid, &JobFilter::default())
        .await
        .expect("read back");

    let found = jobs
        .iter()
        .find(|job| job.id == created.id)
        .expect("created job is returned for its owner");

    assert_eq!(found.title, created.title);
    assert_eq!(found.start, created.start);
    assert_eq!(found.end, created.end);
    assert_eq!(found.status, created.status);
    assert_eq!(found.priority, created.priority);
}

#[tokio::test]
async fn test_cross_account_delete_is_denied() {
    require_emulator!();

    let db = common::test_db().await;
    let service = JobService::new(db);
    let owner = format!("owner-{}", uuid::Uuid::new_v4());
    let attacker = format!("attacker-{}", uuid::Uuid::new_v4());

    let created = service
        .create_job(&owner, job_data("Protected job"))
        .await
        .expect("create");

    let err = service
        .delete_job(&attacker, &created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AccessDenied(_)));

    // The record must still exist
    let remaining = service.get_job(&created.id).await.expect("lookup");
    assert!(remaining.is_some());

    // The owner can delete it
    service
        .delete_job(&owner, &created.id)
        .await
        .expect("owner delete");
}
