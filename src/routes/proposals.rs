// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proposal routes, including the PDF download.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Proposal;
use crate::services::pdf;
use crate::services::proposals::{CreateProposalData, ProposalFilter, UpdateProposalData};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/proposals", get(list_proposals).post(create_proposal))
        .route(
            "/api/proposals/{id}",
            get(get_proposal).put(update_proposal).delete(delete_proposal),
        )
        .route("/api/proposals/{id}/pdf", get(proposal_pdf))
}

/// List proposals with optional AND-combined filters.
async fn list_proposals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<ProposalFilter>,
) -> Result<Json<Vec<Proposal>>> {
    let proposals = state
        .proposal_service
        .get_proposals(&user.uid, &filter)
        .await?;
    Ok(Json(proposals))
}

/// Create a proposal; totals are derived server-side from the sections.
async fn create_proposal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(data): Json<CreateProposalData>,
) -> Result<Json<Proposal>> {
    let proposal = state
        .proposal_service
        .create_proposal(&user.uid, data)
        .await?;
    Ok(Json(proposal))
}

/// Get one proposal.
async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(proposal_id): Path<String>,
) -> Result<Json<Proposal>> {
    let proposal = state
        .proposal_service
        .get_proposal(&proposal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", proposal_id)))?;
    Ok(Json(proposal))
}

/// Update a proposal; totals recomputed when sections are included.
async fn update_proposal(
    State(state): State<Arc<AppState>>,
    Path(proposal_id): Path<String>,
    Json(data): Json<UpdateProposalData>,
) -> Result<Json<Proposal>> {
    let proposal = state
        .proposal_service
        .update_proposal(&proposal_id, data)
        .await?;
    Ok(Json(proposal))
}

/// Response for proposal deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteProposalResponse {
    pub success: bool,
}

/// Delete a proposal.
async fn delete_proposal(
    State(state): State<Arc<AppState>>,
    Path(proposal_id): Path<String>,
) -> Result<Json<DeleteProposalResponse>> {
    state.proposal_service.delete_proposal(&proposal_id).await?;
    Ok(Json(DeleteProposalResponse { success: true }))
}

/// Render a proposal as a downloadable PDF.
async fn proposal_pdf(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(proposal_id): Path<String>,
) -> Result<impl IntoResponse> {
    let proposal = state
        .proposal_service
        .get_proposal(&proposal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", proposal_id)))?;

    // Company header is best-effort: fall back to the generic banner
    let company = match state.company_service.get_company_info(&user.uid).await {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "Could not load company info for PDF");
            None
        }
    };

    let bytes = pdf::generate_proposal_pdf(&proposal, company.as_ref())?;
    let filename = pdf::pdf_filename(&proposal.title);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}
