//! Claim listing filters and pagination

use fra_common::{Error, Outcome, PipelineStage, Result};
use serde::Deserialize;

use crate::models::{Claim, ClaimType};

/// Query accepted by the claims listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimQuery {
    /// Gram panchayat code; defaults to the caller's own
    pub jurisdiction: Option<String>,

    pub stage: Option<PipelineStage>,

    pub outcome: Option<Outcome>,

    pub claim_type: Option<ClaimType>,

    /// Case-insensitive match on id, claimant name or village
    pub search: Option<String>,

    /// 1-based page number
    pub page: Option<usize>,

    /// Page size; no limit returns every match
    pub limit: Option<usize>,
}

impl ClaimQuery {
    fn matches(&self, claim: &Claim, needle: Option<&str>) -> bool {
        if let Some(stage) = self.stage {
            if claim.status().stage() != Some(stage) {
                return false;
            }
        }
        if let Some(outcome) = self.outcome {
            if claim.status().outcome() != outcome {
                return false;
            }
        }
        if let Some(claim_type) = self.claim_type {
            if claim.claim_type != claim_type {
                return false;
            }
        }
        match needle {
            Some(needle) => {
                claim.id.to_lowercase().contains(needle)
                    || claim.claimant.name.to_lowercase().contains(needle)
                    || claim.land_details.village.to_lowercase().contains(needle)
            }
            None => true,
        }
    }

    /// Filter, sort newest first, then cut the requested page
    pub fn apply(&self, claims: Vec<Claim>) -> Result<Vec<Claim>> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut matched: Vec<Claim> = claims
            .into_iter()
            .filter(|claim| self.matches(claim, needle.as_deref()))
            .collect();

        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let Some(limit) = self.limit else {
            return Ok(matched);
        };
        if limit == 0 {
            return Err(Error::Validation("limit must be at least 1".into()));
        }

        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(Error::Validation("page numbers start at 1".into()));
        }

        Ok(matched
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect())
    }
}
