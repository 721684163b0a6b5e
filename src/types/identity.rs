//! Identity records shared by the repository, the auth core and the API.
//!
//! Buyers and developers live in separate tables but share one email
//! namespace. A [`Principal`] is the resolved, authenticated form of either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// ============= Roles and Statuses =============

/// Closed set of roles known to the system.
///
/// Buyer-table rows carry either `Buyer` or `Admin`; developers are always
/// `Developer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Developer,
    Admin,
}

impl Role {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Developer => "developer",
            Role::Admin => "admin",
        }
    }

    /// Parses a stored role. Case-insensitive; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "buyer" => Some(Role::Buyer),
            "developer" => Some(Role::Developer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Developer verification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(VerificationStatus::Pending),
            "verified" => Some(VerificationStatus::Verified),
            "rejected" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of principal carried in a token and reported as `user_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Buyer,
    Developer,
    UnverifiedDeveloper,
    Admin,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Buyer => "buyer",
            PrincipalKind::Developer => "developer",
            PrincipalKind::UnverifiedDeveloper => "unverified_developer",
            PrincipalKind::Admin => "admin",
        }
    }

    /// Whether the subject id of this kind refers to the buyer table.
    pub fn is_buyer_backed(&self) -> bool {
        match self {
            PrincipalKind::Buyer | PrincipalKind::Admin => true,
            PrincipalKind::Developer | PrincipalKind::UnverifiedDeveloper => false,
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============= Records =============

/// A buyer account. Admins are buyers whose role is [`Role::Admin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Buyer {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Buyer {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn kind(&self) -> PrincipalKind {
        match self.role {
            Role::Admin => PrincipalKind::Admin,
            Role::Buyer | Role::Developer => PrincipalKind::Buyer,
        }
    }
}

/// A construction company account.
#[derive(Debug, Clone, PartialEq)]
pub struct Developer {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub company_name: String,
    pub contact_person: String,
    pub phone: String,
    pub address: String,
    pub website: Option<String>,
    pub verification_status: VerificationStatus,
    /// Reason given by the admin on the last rejection; cleared on verify/reset.
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Developer {
    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    pub fn kind(&self) -> PrincipalKind {
        if self.is_verified() {
            PrincipalKind::Developer
        } else {
            PrincipalKind::UnverifiedDeveloper
        }
    }
}

/// Fields needed to insert a buyer-table row.
#[derive(Debug, Clone)]
pub struct NewBuyer {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Fields needed to insert a developer row. Status always starts as pending.
#[derive(Debug, Clone)]
pub struct NewDeveloper {
    pub email: String,
    pub password_hash: String,
    pub company_name: String,
    pub contact_person: String,
    pub phone: String,
    pub address: String,
    pub website: Option<String>,
}

// ============= Principal =============

/// An authenticated actor.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Buyer(Buyer),
    Developer(Developer),
}

impl Principal {
    pub fn id(&self) -> i64 {
        match self {
            Principal::Buyer(b) => b.id,
            Principal::Developer(d) => d.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Buyer(b) => &b.email,
            Principal::Developer(d) => &d.email,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Principal::Buyer(b) => &b.password_hash,
            Principal::Developer(d) => &d.password_hash,
        }
    }

    /// Developers have no deactivation flag and are always active.
    pub fn is_active(&self) -> bool {
        match self {
            Principal::Buyer(b) => b.is_active,
            Principal::Developer(_) => true,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Buyer(b) => b.role,
            Principal::Developer(_) => Role::Developer,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::Buyer(b) => b.kind(),
            Principal::Developer(d) => d.kind(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Principal::Buyer(b) => b.created_at,
            Principal::Developer(d) => d.created_at,
        }
    }
}

impl From<Buyer> for Principal {
    fn from(buyer: Buyer) -> Self {
        Principal::Buyer(buyer)
    }
}

impl From<Developer> for Principal {
    fn from(developer: Developer) -> Self {
        Principal::Developer(developer)
    }
}
