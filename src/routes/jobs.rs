// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Job scheduling routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Job, JobStats};
use crate::services::jobs::{CreateJobData, JobFilter, UpdateJobData};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route("/api/jobs/stats", get(job_stats))
        .route("/api/jobs/upcoming", get(upcoming_jobs))
        .route("/api/jobs/search", get(search_jobs))
        .route("/api/jobs/{id}", put(update_job).delete(delete_job))
}

/// List jobs with optional AND-combined filters.
async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<Vec<Job>>> {
    let jobs = state.job_service.get_jobs(&user.uid, &filter).await?;
    Ok(Json(jobs))
}

/// Create a job.
async fn create_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(data): Json<CreateJobData>,
) -> Result<Json<Job>> {
    let job = state.job_service.create_job(&user.uid, data).await?;
    Ok(Json(job))
}

/// Update a job.
async fn update_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(job_id): Path<String>,
    Json(data): Json<UpdateJobData>,
) -> Result<Json<Job>> {
    let job = state.job_service.update_job(&user.uid, &job_id, data).await?;
    Ok(Json(job))
}

/// Response for job deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteJobResponse {
    pub success: bool,
}

/// Delete a job (ownership verified against the caller).
async fn delete_job(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(job_id): Path<String>,
) -> Result<Json<DeleteJobResponse>> {
    state.job_service.delete_job(&user.uid, &job_id).await?;
    Ok(Json(DeleteJobResponse { success: true }))
}

/// Per-status and per-priority counts.
async fn job_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<JobStats>> {
    let stats = state.job_service.get_job_stats(&user.uid).await?;
    Ok(Json(stats))
}

/// Scheduled jobs starting in the next 7 days.
async fn upcoming_jobs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Job>>> {
    let jobs = state.job_service.get_upcoming_jobs(&user.uid).await?;
    Ok(Json(jobs))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

/// Substring search over title, description, client, and location.
async fn search_jobs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Job>>> {
    let term = query
        .q
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing search term".to_string()))?;

    let jobs = state.job_service.search_jobs(&user.uid, &term).await?;
    Ok(Json(jobs))
}
