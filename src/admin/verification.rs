use crate::db::{IdentityRepository, StatusUpdate, StatusWrite};
use crate::types::{AppError, Buyer, Developer, DeveloperListResponse, Result, VerificationStatus};
use std::sync::Arc;

const DEVELOPER_NOT_FOUND: &str = "Developer not found.";

/// Admin review of developer accounts.
///
/// ```text
/// PENDING --verify--> VERIFIED
/// PENDING --reject--> REJECTED
/// any     --reset---> PENDING
/// ```
///
/// There is no direct move between VERIFIED and REJECTED; an admin resets
/// first. Each transition is a single conditional write, so two admins acting
/// on the same developer cannot both succeed.
#[derive(Clone)]
pub struct VerificationWorkflow {
    repository: Arc<dyn IdentityRepository>,
}

impl VerificationWorkflow {
    pub fn new(repository: Arc<dyn IdentityRepository>) -> Self {
        Self { repository }
    }

    /// PENDING to VERIFIED.
    pub async fn verify(&self, developer_id: i64, admin: &Buyer) -> Result<Developer> {
        require_admin(admin)?;

        let update = self
            .repository
            .update_verification_status(
                developer_id,
                VerificationStatus::Verified,
                None,
                StatusWrite::FromPending,
            )
            .await?;

        let developer = match update {
            StatusUpdate::Applied(developer) => developer,
            StatusUpdate::Unchanged(current) => {
                return Err(match current.verification_status {
                    VerificationStatus::Verified => {
                        AppError::Conflict("Developer is already verified.".to_string())
                    }
                    _ => AppError::Conflict(
                        "Developer was rejected. Reset the developer to pending before verifying."
                            .to_string(),
                    ),
                })
            }
            StatusUpdate::Missing => return Err(not_found()),
        };

        tracing::info!(developer_id, admin_id = admin.id, "developer verified");
        Ok(developer)
    }

    /// PENDING to REJECTED, keeping the optional reason for audit.
    pub async fn reject(
        &self,
        developer_id: i64,
        admin: &Buyer,
        reason: Option<&str>,
    ) -> Result<Developer> {
        require_admin(admin)?;
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());

        let update = self
            .repository
            .update_verification_status(
                developer_id,
                VerificationStatus::Rejected,
                reason,
                StatusWrite::FromPending,
            )
            .await?;

        let developer = match update {
            StatusUpdate::Applied(developer) => developer,
            StatusUpdate::Unchanged(current) => {
                return Err(match current.verification_status {
                    VerificationStatus::Rejected => {
                        AppError::Conflict("Developer is already rejected.".to_string())
                    }
                    _ => AppError::Conflict(
                        "Developer is verified. Reset the developer to pending before rejecting."
                            .to_string(),
                    ),
                })
            }
            StatusUpdate::Missing => return Err(not_found()),
        };

        tracing::info!(
            developer_id,
            admin_id = admin.id,
            reason = reason.unwrap_or(""),
            "developer rejected"
        );
        Ok(developer)
    }

    /// Back to PENDING from any state. Clears the rejection reason.
    pub async fn reset(&self, developer_id: i64, admin: &Buyer) -> Result<Developer> {
        require_admin(admin)?;

        let update = self
            .repository
            .update_verification_status(
                developer_id,
                VerificationStatus::Pending,
                None,
                StatusWrite::Unconditional,
            )
            .await?;

        match update {
            StatusUpdate::Applied(developer) | StatusUpdate::Unchanged(developer) => {
                tracing::info!(developer_id, admin_id = admin.id, "developer reset to pending");
                Ok(developer)
            }
            StatusUpdate::Missing => Err(not_found()),
        }
    }

    // ============== Reads ==============

    /// Every developer, with per-status counts.
    pub async fn all_developers(&self) -> Result<DeveloperListResponse> {
        let developers = self.repository.list_developers(None).await?;
        Ok(summarize(&developers))
    }

    pub async fn pending_developers(&self) -> Result<Vec<Developer>> {
        self.repository
            .list_developers(Some(VerificationStatus::Pending))
            .await
    }

    pub async fn developer_by_id(&self, developer_id: i64) -> Result<Developer> {
        self.repository
            .find_developer_by_id(developer_id)
            .await?
            .ok_or_else(not_found)
    }
}

fn require_admin(admin: &Buyer) -> Result<()> {
    if admin.is_admin() && admin.is_active {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Access denied. Admin account required.".to_string(),
        ))
    }
}

fn not_found() -> AppError {
    AppError::NotFound(DEVELOPER_NOT_FOUND.to_string())
}

fn summarize(developers: &[Developer]) -> DeveloperListResponse {
    let count = |status| {
        developers
            .iter()
            .filter(|d| d.verification_status == status)
            .count()
    };

    DeveloperListResponse {
        total_count: developers.len(),
        pending_count: count(VerificationStatus::Pending),
        verified_count: count(VerificationStatus::Verified),
        rejected_count: count(VerificationStatus::Rejected),
        developers: developers.iter().map(Into::into).collect(),
    }
}
