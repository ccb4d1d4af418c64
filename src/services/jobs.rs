// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Job scheduling store: CRUD over the `jobs` collection.

use crate::db::{FirestoreDb, JobQuery};
use crate::error::AppError;
use crate::models::{Job, JobPriority, JobStats, JobStatus};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Fields for creating a job.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    pub status: JobStatus,
    pub priority: JobPriority,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub client: Option<String>,
    pub status: Option<JobStatus>,
    pub priority: Option<JobPriority>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

/// List filters, combined by logical AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub priority: Option<JobPriority>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// Job scheduling service.
#[derive(Clone)]
pub struct JobService {
    db: FirestoreDb,
}

impl JobService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Create a new job.
    ///
    /// Validates required fields and the start/end ordering before any
    /// write.
    pub async fn create_job(&self, uid: &str, data: CreateJobData) -> Result<Job, AppError> {
        if data.title.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Title, start date, and end date are required".to_string(),
            ));
        }
        if data.start >= data.end {
            return Err(AppError::BadRequest(
                "End date must be after start date".to_string(),
            ));
        }

        let now = format_utc_rfc3339(Utc::now());
        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            title: data.title,
            description: data.description,
            start: format_utc_rfc3339(data.start),
            end: format_utc_rfc3339(data.end),
            location: data.location,
            client: data.client,
            status: data.status,
            priority: data.priority,
            assigned_to: data.assigned_to,
            notes: data.notes,
            user_id: uid.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.set_job(&job).await?;
        tracing::info!(uid, job_id = %job.id, "Job created");
        Ok(job)
    }

    /// Update an existing job.
    ///
    /// The start/end ordering is re-validated only when both appear in
    /// the same update.
    pub async fn update_job(
        &self,
        uid: &str,
        job_id: &str,
        data: UpdateJobData,
    ) -> Result<Job, AppError> {
        if let (Some(start), Some(end)) = (data.start, data.end) {
            if start >= end {
                return Err(AppError::BadRequest(
                    "End date must be after start date".to_string(),
                ));
            }
        }

        let mut job = self
            .db
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;
        if job.user_id != uid {
            return Err(AppError::AccessDenied("Job not found or access denied".to_string()));
        }

        if let Some(title) = data.title {
            job.title = title;
        }
        if let Some(description) = data.description {
            job.description = Some(description);
        }
        if let Some(start) = data.start {
            job.start = format_utc_rfc3339(start);
        }
        if let Some(end) = data.end {
            job.end = format_utc_rfc3339(end);
        }
        if let Some(location) = data.location {
            job.location = Some(location);
        }
        if let Some(client) = data.client {
            job.client = Some(client);
        }
        if let Some(status) = data.status {
            job.status = status;
        }
        if let Some(priority) = data.priority {
            job.priority = priority;
        }
        if let Some(assigned_to) = data.assigned_to {
            job.assigned_to = Some(assigned_to);
        }
        if let Some(notes) = data.notes {
            job.notes = Some(notes);
        }
        job.updated_at = format_utc_rfc3339(Utc::now());

        self.db.set_job(&job).await?;
        Ok(job)
    }

    /// Delete a job after verifying the caller owns it.
    ///
    /// The ownership check happens here at the application layer; the
    /// storage layer itself does not enforce it.
    pub async fn delete_job(&self, uid: &str, job_id: &str) -> Result<(), AppError> {
        let job = self.db.get_job(job_id).await?;
        match job {
            Some(job) if job.user_id == uid => {
                self.db.delete_job(job_id).await?;
                tracing::info!(uid, job_id, "Job deleted");
                Ok(())
            }
            _ => Err(AppError::AccessDenied(
                "Job not found or access denied".to_string(),
            )),
        }
    }

    /// Get one job by id.
    pub async fn get_job(&self, job_id: &str) -> Result<Option<Job>, AppError> {
        self.db.get_job(job_id).await
    }

    /// Get jobs for a user with optional filters.
    pub async fn get_jobs(&self, uid: &str, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        let query = JobQuery {
            status: filter.status.map(|s| s.as_str().to_string()),
            priority: filter.priority.map(|p| p.as_str().to_string()),
            start_after: filter.start_date.map(format_utc_rfc3339),
            end_before: filter.end_date.map(format_utc_rfc3339),
            limit: filter.limit,
        };
        self.db.get_jobs_for_user(uid, &query).await
    }

    /// Jobs with a given status.
    pub async fn get_jobs_by_status(
        &self,
        uid: &str,
        status: JobStatus,
    ) -> Result<Vec<Job>, AppError> {
        self.get_jobs(
            uid,
            &JobFilter {
                status: Some(status),
                ..JobFilter::default()
            },
        )
        .await
    }

    /// Jobs with a given priority.
    pub async fn get_jobs_by_priority(
        &self,
        uid: &str,
        priority: JobPriority,
    ) -> Result<Vec<Job>, AppError> {
        self.get_jobs(
            uid,
            &JobFilter {
                priority: Some(priority),
                ..JobFilter::default()
            },
        )
        .await
    }

    /// Scheduled jobs starting in the next 7 days.
    pub async fn get_upcoming_jobs(&self, uid: &str) -> Result<Vec<Job>, AppError> {
        let now = Utc::now();
        self.get_jobs(
            uid,
            &JobFilter {
                status: Some(JobStatus::Scheduled),
                start_date: Some(now),
                end_date: Some(now + Duration::days(7)),
                ..JobFilter::default()
            },
        )
        .await
    }

    /// Jobs within a date range.
    pub async fn get_jobs_by_date_range(
        &self,
        uid: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Vec<Job>, AppError> {
        self.get_jobs(
            uid,
            &JobFilter {
                start_date: Some(start_date),
                end_date: Some(end_date),
                ..JobFilter::default()
            },
        )
        .await
    }

    /// Per-status and per-priority counts, reduced client-side from the
    /// full job set.
    pub async fn get_job_stats(&self, uid: &str) -> Result<JobStats, AppError> {
        let jobs = self.get_jobs(uid, &JobFilter::default()).await?;
        Ok(JobStats::from_jobs(&jobs))
    }

    /// Case-insensitive substring search over title, description, client,
    /// and location.
    pub async fn search_jobs(&self, uid: &str, term: &str) -> Result<Vec<Job>, AppError> {
        let jobs = self.get_jobs(uid, &JobFilter::default()).await?;
        let needle = term.to_lowercase();

        Ok(jobs
            .into_iter()
            .filter(|job| {
                job.title.to_lowercase().contains(&needle)
                    || job
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || job
                        .client
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
                    || job
                        .location
                        .as_deref()
                        .is_some_and(|l| l.to_lowercase().contains(&needle))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn service() -> JobService {
        JobService::new(FirestoreDb::new_mock())
    }

    fn create_data(start_h: u32, end_h: u32) -> CreateJobData {
        CreateJobData {
            title: "Spring cleanup".to_string(),
            description: None,
            start: Utc.with_ymd_and_hms(2026, 4, 1, start_h, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 4, 1, end_h, 0, 0).unwrap(),
            location: None,
            client: None,
            status: JobStatus::Scheduled,
            priority: JobPriority::Medium,
            assigned_to: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_end_before_start() {
        let err = service()
            .create_job("uid-1", create_data(17, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_equal_start_and_end() {
        let err = service()
            .create_job("uid-1", create_data(9, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let mut data = create_data(9, 17);
        data.title = "   ".to_string();
        let err = service().create_job("uid-1", data).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_validates_before_any_write() {
        // The offline mock errors on any db access, so a BadRequest
        // proves validation ran first.
        let err = service()
            .create_job("uid-1", create_data(17, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_inverted_range_when_both_supplied() {
        let data = UpdateJobData {
            start: Some(Utc.with_ymd_and_hms(2026, 4, 2, 12, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2026, 4, 2, 11, 0, 0).unwrap()),
            ..UpdateJobData::default()
        };
        let err = service().update_job("uid-1", "job-1", data).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_with_only_start_skips_range_check() {
        // Only one bound supplied: the range check is skipped and the
        // offline mock's fetch error surfaces instead.
        let data = UpdateJobData {
            start: Some(Utc.with_ymd_and_hms(2026, 4, 2, 12, 0, 0).unwrap()),
            ..UpdateJobData::default()
        };
        let err = service().update_job("uid-1", "job-1", data).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
