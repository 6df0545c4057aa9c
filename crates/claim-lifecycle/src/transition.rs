//! Lifecycle transition rules
//!
//! All state-machine decisions live here so that "editable", "terminal" and
//! "may move to X" are answered in one place. Checks run in a fixed order:
//!
//! 1. terminal claims accept nothing (`TerminalState`)
//! 2. a request for the current state is a no-op
//! 3. the actor's tier must own the current state (`InvalidTransition`)
//! 4. forwarding to the subdivision needs map data (`MissingPrerequisite`)
//! 5. the move must be a lifecycle edge: the state's own rejection, a
//!    forward move inside the tier, or the tier's hand-off

use fra_common::{ClaimStatus, Error, ReviewTier, Result};

use crate::models::{Claim, OfficerProfile};

/// Who is asking for a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub tier: ReviewTier,
}

impl Actor {
    pub fn new(name: impl Into<String>, tier: ReviewTier) -> Self {
        Self {
            name: name.into(),
            tier,
        }
    }

    /// Gram Sabha actor for an officer
    pub fn officer(profile: &OfficerProfile) -> Self {
        Self::new(format!("{} ({})", profile.name, profile.gp_code), ReviewTier::GramSabha)
    }
}

/// What the store should do with a validated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Append a history entry moving to the target
    Apply,
    /// Target equals the current state; leave the claim untouched
    Unchanged,
}

/// Validates transitions against the lifecycle table
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionEngine;

impl TransitionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `actor` may move `claim` to `target`
    pub fn validate(
        &self,
        claim: &Claim,
        target: ClaimStatus,
        actor: &Actor,
    ) -> Result<TransitionOutcome> {
        let current = claim.status();

        if current.is_terminal() {
            return Err(Error::TerminalState(current));
        }

        if target == current {
            return Ok(TransitionOutcome::Unchanged);
        }

        let invalid = Error::InvalidTransition {
            from: current,
            to: target,
        };

        if !actor.tier.owns(current) {
            return Err(invalid);
        }

        if target == ClaimStatus::ForwardedToSubdivision && claim.map_data.is_none() {
            return Err(Error::MissingPrerequisite(format!(
                "Claim {} has no map data; map the claim before forwarding",
                claim.id
            )));
        }

        // The actor owns `current`, so the tier-free edge rule is the rest
        if current.can_step_to(target) {
            Ok(TransitionOutcome::Apply)
        } else {
            Err(invalid)
        }
    }

    /// States `actor` could move `claim` to right now
    pub fn allowed_targets(&self, claim: &Claim, actor: &Actor) -> Vec<ClaimStatus> {
        ClaimStatus::ALL
            .iter()
            .copied()
            .filter(|target| *target != claim.status())
            .filter(|target| {
                matches!(
                    self.validate(claim, *target, actor),
                    Ok(TransitionOutcome::Apply)
                )
            })
            .collect()
    }
}
