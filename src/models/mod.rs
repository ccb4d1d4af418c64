// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod company;
pub mod job;
pub mod proposal;
pub mod user;

pub use company::CompanyInfo;
pub use job::{Job, JobPriority, JobStats, JobStatus};
pub use proposal::{Proposal, ProposalItem, ProposalSection, ProposalStatus};
pub use user::{CalendarLink, CalendarRef, GoogleIdentity, UserProfile};
