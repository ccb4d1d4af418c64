// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Landscape Pro: business management backend for independent
//! landscaping/service companies.
//!
//! This crate provides the backend API for client proposals and invoices,
//! job scheduling, Google Calendar integration, and company profile
//! management.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{CalendarService, CompanyService, JobService, ProposalService, SessionService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub session_service: SessionService,
    pub calendar_service: CalendarService,
    pub job_service: JobService,
    pub proposal_service: ProposalService,
    pub company_service: CompanyService,
}
