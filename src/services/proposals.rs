// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proposal & invoice domain: CRUD over the `proposals` collection.
//!
//! Stored totals are always re-derived from the sections server-side, so
//! callers cannot persist totals that disagree with their line items.

use crate::db::{FirestoreDb, ProposalQuery};
use crate::error::AppError;
use crate::models::proposal::{calculate_totals, ProposalSection, ProposalStatus};
use crate::models::Proposal;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Fields for creating a proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProposalData {
    pub title: String,
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub project_address: String,
    #[serde(default)]
    pub project_description: String,
    pub estimated_start_date: DateTime<Utc>,
    pub estimated_duration: u32,
    #[serde(default)]
    pub sections: Vec<ProposalSection>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub notes: String,
    pub status: ProposalStatus,
    pub valid_until: DateTime<Utc>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProposalData {
    pub title: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub project_address: Option<String>,
    pub project_description: Option<String>,
    pub estimated_start_date: Option<DateTime<Utc>>,
    pub estimated_duration: Option<u32>,
    pub sections: Option<Vec<ProposalSection>>,
    pub tax_rate: Option<f64>,
    pub terms: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ProposalStatus>,
    pub valid_until: Option<DateTime<Utc>>,
}

/// List filters, combined by logical AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// Proposal service.
#[derive(Clone)]
pub struct ProposalService {
    db: FirestoreDb,
}

impl ProposalService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Create a new proposal.
    ///
    /// When sections are supplied, the totals are derived from them here,
    /// overriding whatever the caller passed.
    pub async fn create_proposal(
        &self,
        uid: &str,
        data: CreateProposalData,
    ) -> Result<Proposal, AppError> {
        if data.title.trim().is_empty()
            || data.client_name.trim().is_empty()
            || data.client_email.trim().is_empty()
        {
            return Err(AppError::BadRequest(
                "Title, client name, and client email are required".to_string(),
            ));
        }

        let (subtotal, tax_amount, total_amount) = if data.sections.is_empty() {
            (data.subtotal, data.tax_amount, data.total_amount)
        } else {
            let totals = calculate_totals(&data.sections, data.tax_rate);
            (totals.subtotal, totals.tax_amount, totals.total_amount)
        };

        let now = format_utc_rfc3339(Utc::now());
        let proposal = Proposal {
            id: uuid::Uuid::new_v4().to_string(),
            title: data.title,
            client_name: data.client_name,
            client_email: data.client_email,
            client_phone: data.client_phone,
            client_address: data.client_address,
            project_address: data.project_address,
            project_description: data.project_description,
            estimated_start_date: format_utc_rfc3339(data.estimated_start_date),
            estimated_duration: data.estimated_duration,
            sections: data.sections,
            subtotal,
            tax_rate: data.tax_rate,
            tax_amount,
            total_amount,
            terms: data.terms,
            notes: data.notes,
            status: data.status,
            valid_until: format_utc_rfc3339(data.valid_until),
            user_id: uid.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.set_proposal(&proposal).await?;
        tracing::info!(uid, proposal_id = %proposal.id, "Proposal created");
        Ok(proposal)
    }

    /// Update an existing proposal.
    ///
    /// Totals are recomputed only when the update includes sections; the
    /// tax rate is then taken from the update payload (defaulting to 0).
    pub async fn update_proposal(
        &self,
        proposal_id: &str,
        data: UpdateProposalData,
    ) -> Result<Proposal, AppError> {
        let mut proposal = self
            .db
            .get_proposal(proposal_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", proposal_id)))?;

        if let Some(title) = data.title {
            proposal.title = title;
        }
        if let Some(client_name) = data.client_name {
            proposal.client_name = client_name;
        }
        if let Some(client_email) = data.client_email {
            proposal.client_email = client_email;
        }
        if let Some(client_phone) = data.client_phone {
            proposal.client_phone = client_phone;
        }
        if let Some(client_address) = data.client_address {
            proposal.client_address = client_address;
        }
        if let Some(project_address) = data.project_address {
            proposal.project_address = project_address;
        }
        if let Some(project_description) = data.project_description {
            proposal.project_description = project_description;
        }
        if let Some(start) = data.estimated_start_date {
            proposal.estimated_start_date = format_utc_rfc3339(start);
        }
        if let Some(duration) = data.estimated_duration {
            proposal.estimated_duration = duration;
        }
        if let Some(tax_rate) = data.tax_rate {
            proposal.tax_rate = tax_rate;
        }
        if let Some(terms) = data.terms {
            proposal.terms = terms;
        }
        if let Some(notes) = data.notes {
            proposal.notes = notes;
        }
        if let Some(status) = data.status {
            proposal.status = status;
        }
        if let Some(valid_until) = data.valid_until {
            proposal.valid_until = format_utc_rfc3339(valid_until);
        }

        if let Some(sections) = data.sections {
            let tax_rate = data.tax_rate.unwrap_or(0.0);
            let totals = calculate_totals(&sections, tax_rate);
            proposal.sections = sections;
            proposal.subtotal = totals.subtotal;
            proposal.tax_rate = tax_rate;
            proposal.tax_amount = totals.tax_amount;
            proposal.total_amount = totals.total_amount;
        }

        proposal.updated_at = format_utc_rfc3339(Utc::now());

        self.db.set_proposal(&proposal).await?;
        Ok(proposal)
    }

    /// Delete a proposal.
    // No ownership re-check here, unlike job deletion.
    pub async fn delete_proposal(&self, proposal_id: &str) -> Result<(), AppError> {
        self.db.delete_proposal(proposal_id).await?;
        tracing::info!(proposal_id, "Proposal deleted");
        Ok(())
    }

    /// Get one proposal by id.
    pub async fn get_proposal(&self, proposal_id: &str) -> Result<Option<Proposal>, AppError> {
        self.db.get_proposal(proposal_id).await
    }

    /// Get proposals for a user with optional filters.
    pub async fn get_proposals(
        &self,
        uid: &str,
        filter: &ProposalFilter,
    ) -> Result<Vec<Proposal>, AppError> {
        let query = ProposalQuery {
            status: filter.status.map(|s| s.as_str().to_string()),
            created_after: filter.start_date.map(format_utc_rfc3339),
            created_before: filter.end_date.map(format_utc_rfc3339),
            limit: filter.limit,
        };
        self.db.get_proposals_for_user(uid, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn service() -> ProposalService {
        ProposalService::new(FirestoreDb::new_mock())
    }

    fn create_data() -> CreateProposalData {
        CreateProposalData {
            title: "Backyard renovation".to_string(),
            client_name: "Dana Smith".to_string(),
            client_email: "dana@example.com".to_string(),
            client_phone: String::new(),
            client_address: String::new(),
            project_address: String::new(),
            project_description: String::new(),
            estimated_start_date: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
            estimated_duration: 10,
            sections: Vec::new(),
            subtotal: 0.0,
            tax_rate: 8.5,
            tax_amount: 0.0,
            total_amount: 0.0,
            terms: String::new(),
            notes: String::new(),
            status: ProposalStatus::Draft,
            valid_until: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let mut data = create_data();
        data.title = String::new();
        let err = service().create_proposal("uid-1", data).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_requires_client_email() {
        let mut data = create_data();
        data.client_email = "  ".to_string();
        let err = service().create_proposal("uid-1", data).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_validates_before_any_write() {
        // Offline mock: reaching the db would yield a Database error, so
        // BadRequest proves validation ran first.
        let mut data = create_data();
        data.client_name = String::new();
        let err = service().create_proposal("uid-1", data).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
