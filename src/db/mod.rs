//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{FirestoreDb, JobQuery, ProposalQuery};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const JOBS: &str = "jobs";
    pub const PROPOSALS: &str = "proposals";
    /// Per-user subcollection holding the single `info` document
    pub const COMPANY: &str = "company";
    /// Document id of the company profile within the subcollection
    pub const COMPANY_INFO_DOC: &str = "info";
}
