// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod calendar;
pub mod company;
pub mod google_auth;
pub mod jobs;
pub mod pdf;
pub mod proposals;
pub mod session;
pub mod storage;

pub use calendar::{CalendarApiClient, CalendarService};
pub use company::CompanyService;
pub use google_auth::GoogleAuthClient;
pub use jobs::JobService;
pub use proposals::ProposalService;
pub use session::SessionService;
pub use storage::StorageClient;
