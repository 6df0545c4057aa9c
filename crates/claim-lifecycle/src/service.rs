//! Officer-facing operations
//!
//! Every call names the calling officer. The officer is resolved first,
//! jurisdiction is checked next, and only then does the call reach the
//! store and the transition engine.

use fra_common::{ClaimStatus, Error, PipelineStage, Result, StatusVocabulary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::filter::ClaimQuery;
use crate::jurisdiction;
use crate::models::{Claim, ClaimDetailsUpdate, MapData, NewClaim, OfficerProfile, ProfileUpdate};
use crate::repository::ClaimRepository;
use crate::statistics::{self, Statistics};
use crate::store::ClaimStore;
use crate::transition::Actor;

pub struct ClaimService {
    store: ClaimStore,
    officers: RwLock<HashMap<String, OfficerProfile>>,
    repository: Arc<dyn ClaimRepository>,
    vocabulary: StatusVocabulary,
}

impl ClaimService {
    /// Empty service over `repository`
    pub fn new(repository: Arc<dyn ClaimRepository>, vocabulary: StatusVocabulary) -> Self {
        Self {
            store: ClaimStore::new(repository.clone()),
            officers: RwLock::new(HashMap::new()),
            repository,
            vocabulary,
        }
    }

    /// Service populated with whatever `repository` already holds
    pub async fn load(
        repository: Arc<dyn ClaimRepository>,
        vocabulary: StatusVocabulary,
    ) -> Result<Self> {
        let store = ClaimStore::load(repository.clone()).await?;

        let officers: HashMap<String, OfficerProfile> = repository
            .load_officers()
            .await?
            .into_iter()
            .map(|officer| (officer.id.clone(), officer))
            .collect();
        info!("Loaded {} officer profiles from repository", officers.len());

        Ok(Self {
            store,
            officers: RwLock::new(officers),
            repository,
            vocabulary,
        })
    }

    pub fn store(&self) -> &ClaimStore {
        &self.store
    }

    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    /// Add an officer profile. Fails if the id is already registered.
    pub async fn register_officer(&self, profile: OfficerProfile) -> Result<OfficerProfile> {
        if profile.id.trim().is_empty() || profile.gp_code.trim().is_empty() {
            return Err(Error::Validation(
                "Officer id and gpCode must not be empty".into(),
            ));
        }

        let mut officers = self.officers.write().await;
        if officers.contains_key(&profile.id) {
            return Err(Error::Validation(format!(
                "Officer already registered: {}",
                profile.id
            )));
        }

        self.repository.save_officer(&profile).await?;
        officers.insert(profile.id.clone(), profile.clone());

        info!("Registered officer {} for {}", profile.id, profile.gp_code);
        Ok(profile)
    }

    /// Add an existing claim record, e.g. from a seed file
    pub async fn import_claim(&self, claim: Claim) -> Result<Claim> {
        self.store.insert(claim).await
    }

    /// Resolve the calling officer; unknown callers are refused
    pub async fn officer(&self, officer_id: &str) -> Result<OfficerProfile> {
        self.officers
            .read()
            .await
            .get(officer_id)
            .cloned()
            .ok_or_else(|| Error::Forbidden(format!("Unknown officer: {}", officer_id)))
    }

    async fn authorize_write(&self, officer: &OfficerProfile, claim_id: &str) -> Result<()> {
        let gp_code = self.store.get(claim_id).await.ok().map(|claim| claim.gp_code);
        jurisdiction::authorize_write(officer, claim_id, gp_code.as_deref())
    }

    pub async fn list_claims(&self, officer_id: &str, query: &ClaimQuery) -> Result<Vec<Claim>> {
        let officer = self.officer(officer_id).await?;
        let gp_code = jurisdiction::resolve_jurisdiction(&officer, query.jurisdiction.as_deref())?;

        let claims = self.store.list_by_jurisdiction(gp_code).await;
        query.apply(jurisdiction::scope(&officer, claims))
    }

    pub async fn get_claim(&self, officer_id: &str, claim_id: &str) -> Result<Claim> {
        let officer = self.officer(officer_id).await?;
        let claim = self.store.get(claim_id).await.ok();
        jurisdiction::authorize_read(&officer, claim_id, claim)
    }

    /// File a new claim in the officer's gram panchayat
    pub async fn create_claim(&self, officer_id: &str, new_claim: NewClaim) -> Result<Claim> {
        let officer = self.officer(officer_id).await?;
        new_claim.validate()?;

        let mut claim = Claim::new(
            format!("FRA-{}", Uuid::new_v4()),
            new_claim.claim_type,
            officer.gp_code.clone(),
            new_claim.claimant,
            new_claim.land_details,
        );
        claim.map_data = new_claim.map_data;

        let claim = self.store.insert(claim).await?;
        info!(
            "Officer {} filed {} claim {}",
            officer.id,
            claim.claim_type.category(),
            claim.id
        );
        Ok(claim)
    }

    /// Move a claim to the state named by `label`
    pub async fn transition(
        &self,
        officer_id: &str,
        claim_id: &str,
        label: &str,
        remarks: Option<String>,
    ) -> Result<Claim> {
        let officer = self.officer(officer_id).await?;
        self.authorize_write(&officer, claim_id).await?;

        let target = self.vocabulary.resolve(label)?;
        self.store
            .apply_status(claim_id, target, &Actor::officer(&officer), remarks)
            .await
    }

    /// Pipeline-board drop: move the claim into `stage` via its entry state
    pub async fn move_to_stage(
        &self,
        officer_id: &str,
        claim_id: &str,
        stage: PipelineStage,
        remarks: Option<String>,
    ) -> Result<Claim> {
        let officer = self.officer(officer_id).await?;
        self.authorize_write(&officer, claim_id).await?;

        // Decided under the claim's lock so a concurrent move can't turn a
        // no-op drop into a failed one
        self.store
            .apply_status_with(claim_id, &Actor::officer(&officer), remarks, |claim| {
                if claim.status().stage() == Some(stage) && !claim.is_terminal() {
                    debug!("Claim {} already in stage {:?}", claim_id, stage);
                    None
                } else {
                    Some(stage.entry_status())
                }
            })
            .await
    }

    /// States the officer could move the claim to right now
    pub async fn allowed_transitions(
        &self,
        officer_id: &str,
        claim_id: &str,
    ) -> Result<Vec<ClaimStatus>> {
        let officer = self.officer(officer_id).await?;
        let claim = self.store.get(claim_id).await.ok();
        let claim = jurisdiction::authorize_read(&officer, claim_id, claim)?;

        Ok(self
            .store
            .engine()
            .allowed_targets(&claim, &Actor::officer(&officer)))
    }

    pub async fn attach_map(
        &self,
        officer_id: &str,
        claim_id: &str,
        map_data: MapData,
    ) -> Result<Claim> {
        let officer = self.officer(officer_id).await?;
        self.authorize_write(&officer, claim_id).await?;
        self.store.attach_map(claim_id, map_data).await
    }

    pub async fn update_details(
        &self,
        officer_id: &str,
        claim_id: &str,
        update: ClaimDetailsUpdate,
    ) -> Result<Claim> {
        let officer = self.officer(officer_id).await?;
        self.authorize_write(&officer, claim_id).await?;
        self.store.update_details(claim_id, update).await
    }

    pub async fn statistics(
        &self,
        officer_id: &str,
        jurisdiction: Option<&str>,
    ) -> Result<Statistics> {
        let officer = self.officer(officer_id).await?;
        let gp_code = jurisdiction::resolve_jurisdiction(&officer, jurisdiction)?;

        let claims = self.store.list_by_jurisdiction(gp_code).await;
        Ok(statistics::aggregate(&claims))
    }

    pub async fn profile(&self, officer_id: &str) -> Result<OfficerProfile> {
        self.officer(officer_id).await
    }

    /// Update the officer's self-service fields
    pub async fn update_profile(
        &self,
        officer_id: &str,
        update: ProfileUpdate,
    ) -> Result<OfficerProfile> {
        let mut officers = self.officers.write().await;
        let current = officers
            .get(officer_id)
            .ok_or_else(|| Error::Forbidden(format!("Unknown officer: {}", officer_id)))?;

        let updated = current.updated(update)?;
        self.repository.save_officer(&updated).await?;
        officers.insert(updated.id.clone(), updated.clone());

        info!("Officer {} updated their profile", officer_id);
        Ok(updated)
    }
}
