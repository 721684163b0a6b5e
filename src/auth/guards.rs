//! Access rules over a resolved [`Principal`].
//!
//! Guards are pure: they never touch storage. Each one either hands back the
//! narrowed principal or fails with an authorization error. A tuple `(A, B)`
//! applies `A` then `B`, stopping at the first failure.

use crate::types::{AppError, Buyer, Developer, Principal, PrincipalKind, Result};

/// An access rule applied to the principal of a request.
pub trait Guard {
    /// What a passing check hands to the handler.
    type Output;

    fn check(principal: Principal) -> Result<Self::Output>;
}

/// Any resolved principal.
pub struct Authenticated;

/// Buyer-table principals. Admins are buyer records and pass.
pub struct BuyerOnly;

/// Developers whose verification has been approved.
pub struct VerifiedDeveloper;

/// Developers in any verification state.
pub struct AnyDeveloper;

/// Buyer-table principals holding the admin role.
pub struct AdminOnly;

impl Guard for Authenticated {
    type Output = Principal;

    fn check(principal: Principal) -> Result<Principal> {
        Ok(principal)
    }
}

impl Guard for BuyerOnly {
    type Output = Buyer;

    fn check(principal: Principal) -> Result<Buyer> {
        match principal {
            Principal::Buyer(buyer) => Ok(buyer),
            Principal::Developer(_) => Err(denied("Buyer account required.")),
        }
    }
}

impl Guard for VerifiedDeveloper {
    type Output = Developer;

    fn check(principal: Principal) -> Result<Developer> {
        match principal {
            Principal::Developer(developer) if developer.is_verified() => Ok(developer),
            Principal::Developer(_) => Err(denied("Developer account verification required.")),
            Principal::Buyer(_) => Err(denied("Developer account required.")),
        }
    }
}

impl Guard for AnyDeveloper {
    type Output = Developer;

    fn check(principal: Principal) -> Result<Developer> {
        match principal {
            Principal::Developer(developer) => Ok(developer),
            Principal::Buyer(_) => Err(denied("Developer account required.")),
        }
    }
}

impl Guard for AdminOnly {
    type Output = Buyer;

    fn check(principal: Principal) -> Result<Buyer> {
        match principal {
            Principal::Buyer(buyer) if buyer.is_admin() => Ok(buyer),
            _ => Err(denied("Admin account required.")),
        }
    }
}

impl<A, B> Guard for (A, B)
where
    A: Guard,
    A::Output: Into<Principal>,
    B: Guard,
{
    type Output = B::Output;

    fn check(principal: Principal) -> Result<B::Output> {
        B::check(A::check(principal)?.into())
    }
}

/// Ad-hoc rule: the principal's kind must be one of `allowed`.
pub fn require_kinds(principal: Principal, allowed: &[PrincipalKind]) -> Result<Principal> {
    if allowed.contains(&principal.kind()) {
        return Ok(principal);
    }

    let names: Vec<&str> = allowed.iter().map(PrincipalKind::as_str).collect();
    Err(denied(&format!(
        "Required user types: {}.",
        names.join(", ")
    )))
}

fn denied(requirement: &str) -> AppError {
    AppError::Authorization(format!("Access denied. {}", requirement))
}
