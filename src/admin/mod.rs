//! Admin-side operations
//!
//! - [`verification`] - Developer review: verify, reject, reset
//! - [`accounts`] - Admin account creation, listing, deactivation and bootstrap

/// Admin account management.
pub mod accounts;
/// Developer verification workflow.
pub mod verification;

pub use accounts::{AdminAccounts, BootstrapOutcome, InitialAdmin};
pub use verification::VerificationWorkflow;
