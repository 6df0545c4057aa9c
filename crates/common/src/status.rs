//! Claim lifecycle vocabulary
//!
//! The lifecycle is one forward sequence split into three review tiers:
//!
//! ```text
//! Gram Sabha:   Submitted -> RecommendedByGramSabha -> MappedByGramSabha
//! Subdivision:  ForwardedToSubdivision -> UnderSubdivisionReview -> ApprovedBySubdivision
//! District:     ForwardedToDistrict -> UnderDistrictReview -> ApprovedByDistrict
//! Final:        FinalApproved
//! ```
//!
//! Every non-terminal state also has one rejection it may fall into.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Lifecycle state of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    Submitted,
    RecommendedByGramSabha,
    MappedByGramSabha,
    ForwardedToSubdivision,
    UnderSubdivisionReview,
    ApprovedBySubdivision,
    RejectedBySubdivision,
    ForwardedToDistrict,
    UnderDistrictReview,
    ApprovedByDistrict,
    RejectedByDistrict,
    FinalApproved,
    FinalRejected,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 13] = [
        ClaimStatus::Submitted,
        ClaimStatus::RecommendedByGramSabha,
        ClaimStatus::MappedByGramSabha,
        ClaimStatus::ForwardedToSubdivision,
        ClaimStatus::UnderSubdivisionReview,
        ClaimStatus::ApprovedBySubdivision,
        ClaimStatus::RejectedBySubdivision,
        ClaimStatus::ForwardedToDistrict,
        ClaimStatus::UnderDistrictReview,
        ClaimStatus::ApprovedByDistrict,
        ClaimStatus::RejectedByDistrict,
        ClaimStatus::FinalApproved,
        ClaimStatus::FinalRejected,
    ];

    /// Canonical label
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "Submitted",
            ClaimStatus::RecommendedByGramSabha => "RecommendedByGramSabha",
            ClaimStatus::MappedByGramSabha => "MappedByGramSabha",
            ClaimStatus::ForwardedToSubdivision => "ForwardedToSubdivision",
            ClaimStatus::UnderSubdivisionReview => "UnderSubdivisionReview",
            ClaimStatus::ApprovedBySubdivision => "ApprovedBySubdivision",
            ClaimStatus::RejectedBySubdivision => "RejectedBySubdivision",
            ClaimStatus::ForwardedToDistrict => "ForwardedToDistrict",
            ClaimStatus::UnderDistrictReview => "UnderDistrictReview",
            ClaimStatus::ApprovedByDistrict => "ApprovedByDistrict",
            ClaimStatus::RejectedByDistrict => "RejectedByDistrict",
            ClaimStatus::FinalApproved => "FinalApproved",
            ClaimStatus::FinalRejected => "FinalRejected",
        }
    }

    /// Position on the forward sequence. Rejections sit off the sequence.
    pub fn forward_rank(self) -> Option<u8> {
        match self {
            ClaimStatus::Submitted => Some(0),
            ClaimStatus::RecommendedByGramSabha => Some(1),
            ClaimStatus::MappedByGramSabha => Some(2),
            ClaimStatus::ForwardedToSubdivision => Some(3),
            ClaimStatus::UnderSubdivisionReview => Some(4),
            ClaimStatus::ApprovedBySubdivision => Some(5),
            ClaimStatus::ForwardedToDistrict => Some(6),
            ClaimStatus::UnderDistrictReview => Some(7),
            ClaimStatus::ApprovedByDistrict => Some(8),
            ClaimStatus::FinalApproved => Some(9),
            ClaimStatus::RejectedBySubdivision
            | ClaimStatus::RejectedByDistrict
            | ClaimStatus::FinalRejected => None,
        }
    }

    pub fn is_rejection(self) -> bool {
        matches!(
            self,
            ClaimStatus::RejectedBySubdivision
                | ClaimStatus::RejectedByDistrict
                | ClaimStatus::FinalRejected
        )
    }

    pub fn is_terminal(self) -> bool {
        self.is_rejection() || self == ClaimStatus::FinalApproved
    }

    /// Whether the owning Gram Sabha officer may still change the claim
    pub fn is_editable(self) -> bool {
        self.tier() == Some(ReviewTier::GramSabha)
    }

    /// Review tier that owns this state; `None` for terminal states
    pub fn tier(self) -> Option<ReviewTier> {
        match self {
            ClaimStatus::Submitted
            | ClaimStatus::RecommendedByGramSabha
            | ClaimStatus::MappedByGramSabha => Some(ReviewTier::GramSabha),
            ClaimStatus::ForwardedToSubdivision
            | ClaimStatus::UnderSubdivisionReview
            | ClaimStatus::ApprovedBySubdivision => Some(ReviewTier::Subdivision),
            ClaimStatus::ForwardedToDistrict
            | ClaimStatus::UnderDistrictReview
            | ClaimStatus::ApprovedByDistrict => Some(ReviewTier::District),
            _ => None,
        }
    }

    /// The rejection a non-terminal state may fall into
    pub fn rejection_target(self) -> Option<ClaimStatus> {
        match self {
            ClaimStatus::ApprovedByDistrict => Some(ClaimStatus::FinalRejected),
            ClaimStatus::ForwardedToDistrict | ClaimStatus::UnderDistrictReview => {
                Some(ClaimStatus::RejectedByDistrict)
            }
            s if s.is_terminal() => None,
            _ => Some(ClaimStatus::RejectedBySubdivision),
        }
    }

    /// Whether `self -> to` is an edge of the lifecycle, regardless of who
    /// takes it: the state's own rejection, a forward move inside its tier,
    /// or the tier's hand-off
    pub fn can_step_to(self, to: ClaimStatus) -> bool {
        let Some(tier) = self.tier() else {
            return false;
        };
        if to.is_rejection() {
            return self.rejection_target() == Some(to);
        }

        let ahead = matches!(
            (self.forward_rank(), to.forward_rank()),
            (Some(from), Some(next)) if next > from
        );
        ahead && (tier.owns(to) || tier.handoff() == (self, to))
    }

    /// Pipeline bucket the state is counted in; rejections have none
    pub fn stage(self) -> Option<PipelineStage> {
        match self {
            ClaimStatus::Submitted => Some(PipelineStage::Submitted),
            ClaimStatus::FinalApproved => Some(PipelineStage::FinalApproval),
            s => match s.tier() {
                Some(ReviewTier::GramSabha) => Some(PipelineStage::VerifiedByGramSabha),
                Some(ReviewTier::Subdivision) => Some(PipelineStage::ReviewedAtBlock),
                Some(ReviewTier::District) => Some(PipelineStage::DistrictReview),
                None => None,
            },
        }
    }

    pub fn outcome(self) -> Outcome {
        if self.is_rejection() {
            Outcome::Rejected
        } else if self == ClaimStatus::FinalApproved {
            Outcome::Approved
        } else {
            Outcome::Pending
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ClaimStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("Unknown claim status: {}", s)))
    }
}

/// Administrative tier that reviews a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewTier {
    GramSabha,
    Subdivision,
    District,
}

impl ReviewTier {
    /// The only edge that leaves this tier going forward, as `(from, to)`
    pub fn handoff(self) -> (ClaimStatus, ClaimStatus) {
        match self {
            ReviewTier::GramSabha => (
                ClaimStatus::MappedByGramSabha,
                ClaimStatus::ForwardedToSubdivision,
            ),
            ReviewTier::Subdivision => (
                ClaimStatus::ApprovedBySubdivision,
                ClaimStatus::ForwardedToDistrict,
            ),
            ReviewTier::District => (ClaimStatus::ApprovedByDistrict, ClaimStatus::FinalApproved),
        }
    }

    pub fn owns(self, status: ClaimStatus) -> bool {
        status.tier() == Some(self)
    }
}

/// Dashboard pipeline column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineStage {
    Submitted,
    VerifiedByGramSabha,
    ReviewedAtBlock,
    DistrictReview,
    FinalApproval,
}

impl PipelineStage {
    /// State a claim enters when dropped into this column
    pub fn entry_status(self) -> ClaimStatus {
        match self {
            PipelineStage::Submitted => ClaimStatus::Submitted,
            PipelineStage::VerifiedByGramSabha => ClaimStatus::RecommendedByGramSabha,
            PipelineStage::ReviewedAtBlock => ClaimStatus::ForwardedToSubdivision,
            PipelineStage::DistrictReview => ClaimStatus::ForwardedToDistrict,
            PipelineStage::FinalApproval => ClaimStatus::FinalApproved,
        }
    }
}

/// Coarse filter category used by the claims table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pending,
    Approved,
    Rejected,
}

/// Labels the dashboard has historically used for states
const BUILTIN_ALIASES: &[(&str, ClaimStatus)] = &[
    ("Pending", ClaimStatus::Submitted),
    ("VerifiedByGramSabha", ClaimStatus::RecommendedByGramSabha),
    ("ApprovedByGramSabha", ClaimStatus::RecommendedByGramSabha),
    ("ForwardedToSDLC", ClaimStatus::ForwardedToSubdivision),
    ("UnderSDLCReview", ClaimStatus::UnderSubdivisionReview),
    ("ApprovedBySDLC", ClaimStatus::ApprovedBySubdivision),
    ("RejectedBySDLC", ClaimStatus::RejectedBySubdivision),
    ("ForwardedToDLC", ClaimStatus::ForwardedToDistrict),
    ("UnderDLCReview", ClaimStatus::UnderDistrictReview),
    ("ApprovedByDLC", ClaimStatus::ApprovedByDistrict),
    ("RejectedByDLC", ClaimStatus::RejectedByDistrict),
    ("Approved", ClaimStatus::FinalApproved),
    ("Rejected", ClaimStatus::FinalRejected),
];

/// Resolves external status labels to canonical states.
///
/// Lookups are case-insensitive. Canonical names always resolve; aliases can
/// be added on top of the built-in set.
#[derive(Debug, Clone)]
pub struct StatusVocabulary {
    labels: HashMap<String, ClaimStatus>,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        let mut labels = HashMap::new();
        for status in ClaimStatus::ALL {
            labels.insert(status.as_str().to_ascii_lowercase(), status);
        }
        for (alias, status) in BUILTIN_ALIASES {
            labels.insert(alias.to_ascii_lowercase(), *status);
        }
        Self { labels }
    }
}

impl StatusVocabulary {
    /// Build a vocabulary from `Alias=Canonical` pairs separated by commas
    pub fn with_aliases(pairs: &str) -> Result<Self> {
        let mut vocabulary = Self::default();
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (alias, canonical) = pair.split_once('=').ok_or_else(|| {
                Error::Validation(format!("Malformed status alias (expected A=B): {}", pair))
            })?;
            let status: ClaimStatus = canonical.parse()?;
            vocabulary.add_alias(alias, status)?;
        }
        Ok(vocabulary)
    }

    /// Register an alias. Canonical names cannot be redirected.
    pub fn add_alias(&mut self, alias: &str, status: ClaimStatus) -> Result<()> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(Error::Validation("Status alias must not be empty".into()));
        }
        if let Ok(canonical) = alias.parse::<ClaimStatus>() {
            if canonical != status {
                return Err(Error::Validation(format!(
                    "Alias {} would shadow canonical status {}",
                    alias, canonical
                )));
            }
        }
        self.labels.insert(alias.to_ascii_lowercase(), status);
        Ok(())
    }

    pub fn resolve(&self, label: &str) -> Result<ClaimStatus> {
        self.labels
            .get(&label.trim().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| Error::Validation(format!("Unknown claim status: {}", label)))
    }
}
