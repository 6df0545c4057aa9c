//! Jurisdiction scoping
//!
//! An officer sees and changes only claims of their own gram panchayat.
//! Out-of-jurisdiction claims are reported exactly like missing ones so that
//! callers cannot probe for their existence.

use fra_common::{Error, Result};

use crate::models::{Claim, OfficerProfile};

/// Claims visible to `officer`
pub fn scope(officer: &OfficerProfile, claims: Vec<Claim>) -> Vec<Claim> {
    claims
        .into_iter()
        .filter(|claim| claim.gp_code == officer.gp_code)
        .collect()
}

/// Resolve an optional `jurisdiction` query parameter against the officer
pub fn resolve_jurisdiction<'a>(
    officer: &'a OfficerProfile,
    requested: Option<&'a str>,
) -> Result<&'a str> {
    match requested.map(str::trim).filter(|gp| !gp.is_empty()) {
        None => Ok(officer.gp_code.as_str()),
        Some(gp) if gp == officer.gp_code => Ok(officer.gp_code.as_str()),
        Some(gp) => Err(Error::Forbidden(format!(
            "Officer {} has no access to jurisdiction {}",
            officer.id, gp
        ))),
    }
}

/// Gate a read of a single claim; `None` means the id is unknown
pub fn authorize_read(
    officer: &OfficerProfile,
    claim_id: &str,
    claim: Option<Claim>,
) -> Result<Claim> {
    match claim {
        Some(claim) if claim.gp_code == officer.gp_code => Ok(claim),
        _ => Err(Error::NotFound(claim_id.to_string())),
    }
}

/// Gate a write to a single claim; `gp_code` is `None` when the id is unknown
pub fn authorize_write(
    officer: &OfficerProfile,
    claim_id: &str,
    gp_code: Option<&str>,
) -> Result<()> {
    match gp_code {
        Some(gp) if gp == officer.gp_code => Ok(()),
        _ => Err(Error::Forbidden(format!(
            "Claim {} is outside the jurisdiction of officer {}",
            claim_id, officer.id
        ))),
    }
}
