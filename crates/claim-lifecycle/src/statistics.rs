//! Dashboard statistics derived from a claim set

use fra_common::{Outcome, PipelineStage};
use serde::{Deserialize, Serialize};

use crate::models::{Claim, ClaimType};

/// Per-stage claim counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub submitted: usize,
    pub verified_by_gram_sabha: usize,
    pub reviewed_at_block: usize,
    pub district_review: usize,
    pub final_approval: usize,

    /// Claims in any rejected state; these are in no stage counter
    pub rejected: usize,

    pub individual_claims: usize,
    pub community_claims: usize,

    pub total: usize,

    /// `final_approval / total * 100`, unrounded; 0 for an empty set
    pub success_rate: f64,
}

/// Recompute statistics from scratch. Same input, same output.
pub fn aggregate<'a, I>(claims: I) -> Statistics
where
    I: IntoIterator<Item = &'a Claim>,
{
    let mut stats = Statistics::default();

    for claim in claims {
        stats.total += 1;

        match claim.claim_type {
            ClaimType::Individual => stats.individual_claims += 1,
            ClaimType::Community => stats.community_claims += 1,
        }

        let status = claim.status();
        if status.outcome() == Outcome::Rejected {
            stats.rejected += 1;
        }

        match status.stage() {
            Some(PipelineStage::Submitted) => stats.submitted += 1,
            Some(PipelineStage::VerifiedByGramSabha) => stats.verified_by_gram_sabha += 1,
            Some(PipelineStage::ReviewedAtBlock) => stats.reviewed_at_block += 1,
            Some(PipelineStage::DistrictReview) => stats.district_review += 1,
            Some(PipelineStage::FinalApproval) => stats.final_approval += 1,
            None => {}
        }
    }

    stats.success_rate = success_rate(stats.final_approval, stats.total);
    stats
}

fn success_rate(approved: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    // Multiply before dividing so whole percentages stay exact
    approved as f64 * 100.0 / total as f64
}
