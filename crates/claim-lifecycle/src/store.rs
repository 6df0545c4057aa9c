//! In-memory claim store with write-through persistence
//!
//! Each claim sits behind its own async mutex, so transitions on one claim
//! serialize while different claims proceed independently. A mutation is
//! built on a copy, persisted, and only then swapped in: a failed write
//! leaves the stored claim untouched.

use chrono::Utc;
use fra_common::{ClaimStatus, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::models::{Claim, ClaimDetailsUpdate, MapData};
use crate::repository::ClaimRepository;
use crate::transition::{Actor, TransitionEngine, TransitionOutcome};

type ClaimSlot = Arc<Mutex<Claim>>;

pub struct ClaimStore {
    claims: RwLock<HashMap<String, ClaimSlot>>,
    /// Serializes inserts so the map lock is never held across a write
    inserts: Mutex<()>,
    repository: Arc<dyn ClaimRepository>,
    engine: TransitionEngine,
}

impl ClaimStore {
    pub fn new(repository: Arc<dyn ClaimRepository>) -> Self {
        Self {
            claims: RwLock::new(HashMap::new()),
            inserts: Mutex::new(()),
            repository,
            engine: TransitionEngine::new(),
        }
    }

    /// Populate the store from the repository
    pub async fn load(repository: Arc<dyn ClaimRepository>) -> Result<Self> {
        let store = Self::new(repository.clone());
        let claims = repository.load_claims().await?;
        let count = claims.len();

        {
            let mut map = store.claims.write().await;
            for claim in claims {
                claim.check_history()?;
                map.insert(claim.id.clone(), Arc::new(Mutex::new(claim)));
            }
        }

        info!("Loaded {} claims from repository", count);
        Ok(store)
    }

    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    /// Add a claim. Fails if the id is taken or the history is inconsistent.
    pub async fn insert(&self, claim: Claim) -> Result<Claim> {
        claim.check_history()?;

        // Only inserts add ids, so the duplicate check holds until we insert
        let _insert = self.inserts.lock().await;
        if self.contains(&claim.id).await {
            return Err(Error::Validation(format!(
                "Claim already exists: {}",
                claim.id
            )));
        }

        self.repository.save_claim(&claim).await?;
        self.claims
            .write()
            .await
            .insert(claim.id.clone(), Arc::new(Mutex::new(claim.clone())));

        debug!("Inserted claim {} for {}", claim.id, claim.gp_code);
        Ok(claim)
    }

    async fn slot(&self, id: &str) -> Result<ClaimSlot> {
        self.claims
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.claims.read().await.contains_key(id)
    }

    /// Look up a claim by id
    pub async fn get(&self, id: &str) -> Result<Claim> {
        let slot = self.slot(id).await?;
        let claim = slot.lock().await;
        Ok(claim.clone())
    }

    /// All claims of one gram panchayat, in no particular order
    pub async fn list_by_jurisdiction(&self, gp_code: &str) -> Vec<Claim> {
        self.snapshot()
            .await
            .into_iter()
            .filter(|claim| claim.gp_code == gp_code)
            .collect()
    }

    /// Copy of every claim. Claims mid-transition are observed before or
    /// after the transition, never in between.
    pub async fn snapshot(&self) -> Vec<Claim> {
        let slots: Vec<ClaimSlot> = self.claims.read().await.values().cloned().collect();

        let mut claims = Vec::with_capacity(slots.len());
        for slot in slots {
            claims.push(slot.lock().await.clone());
        }
        claims
    }

    /// Validate and apply a lifecycle transition
    pub async fn apply_status(
        &self,
        id: &str,
        target: ClaimStatus,
        actor: &Actor,
        remarks: Option<String>,
    ) -> Result<Claim> {
        self.apply_status_with(id, actor, remarks, |_| Some(target))
            .await
    }

    /// Like [`ClaimStore::apply_status`], with the target picked by `choose`
    /// from the claim as it stands under its lock. `None` leaves the claim
    /// as it is.
    pub async fn apply_status_with<F>(
        &self,
        id: &str,
        actor: &Actor,
        remarks: Option<String>,
        choose: F,
    ) -> Result<Claim>
    where
        F: FnOnce(&Claim) -> Option<ClaimStatus>,
    {
        let slot = self.slot(id).await?;
        let mut claim = slot.lock().await;

        let Some(target) = choose(&*claim) else {
            debug!("Claim {} needs no transition", id);
            return Ok(claim.clone());
        };

        match self.engine.validate(&claim, target, actor)? {
            TransitionOutcome::Unchanged => {
                debug!("Claim {} already in {}; nothing to do", id, target);
                return Ok(claim.clone());
            }
            TransitionOutcome::Apply => {}
        }

        let from = claim.status();
        let mut next = claim.clone();
        next.record_transition(target, &actor.name, normalize_remarks(remarks), Utc::now());

        self.repository.save_claim(&next).await?;
        *claim = next;

        info!(
            "Claim {} moved {} -> {} by {}",
            id, from, target, actor.name
        );
        Ok(claim.clone())
    }

    /// Attach or replace the map reference of an editable claim
    pub async fn attach_map(&self, id: &str, map_data: MapData) -> Result<Claim> {
        map_data.validate()?;

        self.mutate_editable(id, |claim| {
            claim.map_data = Some(map_data);
        })
        .await
    }

    /// Replace claimant or land details of an editable claim
    pub async fn update_details(&self, id: &str, update: ClaimDetailsUpdate) -> Result<Claim> {
        update.validate()?;

        self.mutate_editable(id, |claim| {
            if let Some(claimant) = update.claimant {
                claim.claimant = claimant;
            }
            if let Some(land_details) = update.land_details {
                claim.land_details = land_details;
            }
        })
        .await
    }

    async fn mutate_editable<F>(&self, id: &str, change: F) -> Result<Claim>
    where
        F: FnOnce(&mut Claim),
    {
        let slot = self.slot(id).await?;
        let mut claim = slot.lock().await;

        if claim.is_terminal() {
            return Err(Error::TerminalState(claim.status()));
        }
        if !claim.is_editable() {
            return Err(Error::Validation(format!(
                "Claim {} can no longer be edited in status {}",
                id,
                claim.status()
            )));
        }

        let mut next = claim.clone();
        change(&mut next);

        self.repository.save_claim(&next).await?;
        *claim = next;

        Ok(claim.clone())
    }
}

fn normalize_remarks(remarks: Option<String>) -> Option<String> {
    remarks
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}
