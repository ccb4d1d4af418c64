// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled job model consumed by the calendar widget.

use serde::{Deserialize, Serialize};

/// One schedulable unit of work, stored in the `jobs` collection.
///
/// Exclusively owned by `user_id`; every read and write is filtered by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Document ID
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Start instant (RFC3339); invariant: `end` is strictly after `start`
    pub start: String,
    /// End instant (RFC3339)
    pub end: String,
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
    /// Owning user id
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl JobStatus {
    /// The persisted string form (used in Firestore filters).
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// Job priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Low,
    Medium,
    High,
}

impl JobPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            JobPriority::Low => "low",
            JobPriority::Medium => "medium",
            JobPriority::High => "high",
        }
    }
}

/// Per-status and per-priority counts, reduced client-side from the full
/// job list (no server-side aggregation).
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct JobStats {
    pub total: u32,
    pub scheduled: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub high_priority: u32,
    pub medium_priority: u32,
    pub low_priority: u32,
}

impl JobStats {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let count_status =
            |s: JobStatus| jobs.iter().filter(|job| job.status == s).count() as u32;
        let count_priority =
            |p: JobPriority| jobs.iter().filter(|job| job.priority == p).count() as u32;

        Self {
            total: jobs.len() as u32,
            scheduled: count_status(JobStatus::Scheduled),
            in_progress: count_status(JobStatus::InProgress),
            completed: count_status(JobStatus::Completed),
            cancelled: count_status(JobStatus::Cancelled),
            high_priority: count_priority(JobPriority::High),
            medium_priority: count_priority(JobPriority::Medium),
            low_priority: count_priority(JobPriority::Low),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(id: &str, status: JobStatus, priority: JobPriority) -> Job {
        Job {
            id: id.to_string(),
            title: format!("Job {}", id),
            description: None,
            start: "2026-04-01T09:00:00Z".to_string(),
            end: "2026-04-01T17:00:00Z".to_string(),
            location: None,
            client: None,
            status,
            priority,
            assigned_to: None,
            notes: None,
            user_id: "uid-1".to_string(),
            created_at: "2026-03-01T00:00:00Z".to_string(),
            updated_at: "2026-03-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_stats_from_jobs() {
        let jobs = vec![
            make_job("1", JobStatus::Scheduled, JobPriority::High),
            make_job("2", JobStatus::Scheduled, JobPriority::Low),
            make_job("3", JobStatus::InProgress, JobPriority::Medium),
            make_job("4", JobStatus::Completed, JobPriority::High),
            make_job("5", JobStatus::Cancelled, JobPriority::Low),
        ];

        let stats = JobStats::from_jobs(&jobs);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.scheduled, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.high_priority, 2);
        assert_eq!(stats.medium_priority, 1);
        assert_eq!(stats.low_priority, 2);
    }

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: JobStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, JobStatus::InProgress);
    }
}
