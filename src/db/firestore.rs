// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, embedded calendar link)
//! - Company info (per-user subcollection document)
//! - Jobs (flat collection filtered by `user_id`)
//! - Proposals (flat collection filtered by `user_id`)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{CompanyInfo, Job, Proposal, UserProfile};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Optional job filters, combined by logical AND.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    /// Persisted status string ("scheduled", ...)
    pub status: Option<String>,
    /// Persisted priority string ("low", ...)
    pub priority: Option<String>,
    /// Jobs starting at or after this instant (RFC3339)
    pub start_after: Option<String>,
    /// Jobs ending at or before this instant (RFC3339)
    pub end_before: Option<String>,
    pub limit: Option<u32>,
}

/// Optional proposal filters, combined by logical AND.
#[derive(Debug, Clone, Default)]
pub struct ProposalQuery {
    /// Persisted status string ("draft", ...)
    pub status: Option<String>,
    /// Proposals created at or after this instant (RFC3339)
    pub created_after: Option<String>,
    /// Proposals created at or before this instant (RFC3339)
    pub created_before: Option<String>,
    pub limit: Option<u32>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Company Info Operations ─────────────────────────────────

    /// Get the company profile document, if one has been written.
    pub async fn get_company_info(&self, uid: &str) -> Result<Option<CompanyInfo>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .by_id_in(collections::COMPANY)
            .parent(&parent_path)
            .obj()
            .one(collections::COMPANY_INFO_DOC)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update the company profile document.
    pub async fn set_company_info(&self, uid: &str, info: &CompanyInfo) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::COMPANY)
            .document_id(collections::COMPANY_INFO_DOC)
            .parent(&parent_path)
            .object(info)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Job Operations ──────────────────────────────────────────

    /// Get a job by document id.
    pub async fn get_job(&self, job_id: &str) -> Result<Option<Job>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::JOBS)
            .obj()
            .one(job_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a job document.
    pub async fn set_job(&self, job: &Job) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::JOBS)
            .document_id(&job.id)
            .object(job)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a job document.
    pub async fn delete_job(&self, job_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::JOBS)
            .document_id(job_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get jobs for a user with optional AND-combined filters, ordered by
    /// start ascending.
    pub async fn get_jobs_for_user(
        &self,
        uid: &str,
        query: &JobQuery,
    ) -> Result<Vec<Job>, AppError> {
        let uid = uid.to_string();
        let q = query.clone();

        let select = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::JOBS)
            .filter(move |f| {
                f.for_all([
                    f.field("user_id").eq(uid.clone()),
                    q.status
                        .clone()
                        .and_then(|status| f.field("status").eq(status)),
                    q.priority
                        .clone()
                        .and_then(|priority| f.field("priority").eq(priority)),
                    q.start_after
                        .clone()
                        .and_then(|start| f.field("start").greater_than_or_equal(start)),
                    q.end_before
                        .clone()
                        .and_then(|end| f.field("end").less_than_or_equal(end)),
                ])
            })
            .order_by([("start", firestore::FirestoreQueryDirection::Ascending)]);

        let select = if let Some(limit) = query.limit {
            select.limit(limit)
        } else {
            select
        };

        select
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Proposal Operations ─────────────────────────────────────

    /// Get a proposal by document id.
    pub async fn get_proposal(&self, proposal_id: &str) -> Result<Option<Proposal>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROPOSALS)
            .obj()
            .one(proposal_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a proposal document.
    pub async fn set_proposal(&self, proposal: &Proposal) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROPOSALS)
            .document_id(&proposal.id)
            .object(proposal)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a proposal document.
    pub async fn delete_proposal(&self, proposal_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PROPOSALS)
            .document_id(proposal_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get proposals for a user with optional AND-combined filters.
    ///
    /// Ordered by created_at descending only when no status filter is
    /// present (a status + created_at ordering needs a composite index).
    pub async fn get_proposals_for_user(
        &self,
        uid: &str,
        query: &ProposalQuery,
    ) -> Result<Vec<Proposal>, AppError> {
        let uid = uid.to_string();
        let q = query.clone();

        let select = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PROPOSALS)
            .filter(move |f| {
                f.for_all([
                    f.field("user_id").eq(uid.clone()),
                    q.status
                        .clone()
                        .and_then(|status| f.field("status").eq(status)),
                    q.created_after
                        .clone()
                        .and_then(|after| f.field("created_at").greater_than_or_equal(after)),
                    q.created_before
                        .clone()
                        .and_then(|before| f.field("created_at").less_than_or_equal(before)),
                ])
            });

        let select = if query.status.is_none() {
            select.order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
        } else {
            select
        };

        let select = if let Some(limit) = query.limit {
            select.limit(limit)
        } else {
            select
        };

        select
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
