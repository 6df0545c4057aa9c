//! End-to-end lifecycle scenarios through the officer-facing service

use async_trait::async_trait;
use claim_lifecycle::{
    Actor, Claim, ClaimQuery, ClaimRepository, ClaimService, ClaimType, Claimant, LandDetails,
    MapData, MemoryRepository, NewClaim, OfficerProfile, ProfileUpdate,
};
use fra_common::{ClaimStatus, Error, PipelineStage, ReviewTier, StatusVocabulary};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn officer(id: &str, gp_code: &str) -> OfficerProfile {
    OfficerProfile {
        id: id.to_string(),
        gp_code: gp_code.to_string(),
        gp_name: format!("{} Panchayat", gp_code),
        subdivision: "Ghatshila".to_string(),
        district: "East Singhbhum".to_string(),
        name: format!("Officer {}", id),
        email: format!("{}@gs.example.in", id),
        contact_number: "9000000001".to_string(),
        assigned_village: "Bhimpur".to_string(),
    }
}

fn new_claim(claim_type: ClaimType, name: &str) -> NewClaim {
    NewClaim {
        claim_type,
        claimant: Claimant {
            name: name.to_string(),
            contact: "9876543210".to_string(),
            address: "Bhimpur".to_string(),
        },
        land_details: LandDetails {
            area_claimed: 1.2,
            village: "Bhimpur".to_string(),
            survey_number: None,
            land_use: Some("Cultivation".to_string()),
            description: None,
        },
        map_data: None,
    }
}

async fn service_with_officers(repository: Arc<dyn ClaimRepository>) -> ClaimService {
    let service = ClaimService::new(repository, StatusVocabulary::default());
    service
        .register_officer(officer("gs-1", "GP001"))
        .await
        .unwrap();
    service
        .register_officer(officer("gs-2", "GP002"))
        .await
        .unwrap();
    service
}

async fn service() -> ClaimService {
    service_with_officers(Arc::new(MemoryRepository::new())).await
}

#[tokio::test]
async fn test_foreign_officer_cannot_transition() {
    let service = service().await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Ramesh Oraon"))
        .await
        .unwrap();
    assert_eq!(claim.status(), ClaimStatus::Submitted);
    assert_eq!(claim.gp_code, "GP001");

    let result = service
        .transition("gs-2", &claim.id, "RecommendedByGramSabha", None)
        .await;
    assert!(matches!(result, Err(Error::Forbidden(_))));

    let unchanged = service.get_claim("gs-1", &claim.id).await.unwrap();
    assert_eq!(unchanged, claim);
}

#[tokio::test]
async fn test_unknown_claim_write_is_forbidden_and_read_is_not_found() {
    let service = service().await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Ramesh Oraon"))
        .await
        .unwrap();

    let missing = service
        .transition("gs-2", "FRA-does-not-exist", "RecommendedByGramSabha", None)
        .await;
    assert!(matches!(missing, Err(Error::Forbidden(_))));

    let foreign_read = service.get_claim("gs-2", &claim.id).await;
    let missing_read = service.get_claim("gs-2", "FRA-does-not-exist").await;
    assert!(matches!(foreign_read, Err(Error::NotFound(_))));
    assert!(matches!(missing_read, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_forward_without_map_then_with_map() {
    let service = service().await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Community, "Bhimpur Gram Sabha"))
        .await
        .unwrap();

    service
        .transition("gs-1", &claim.id, "MappedByGramSabha", None)
        .await
        .unwrap();

    let result = service
        .transition("gs-1", &claim.id, "ForwardedToSubdivision", None)
        .await;
    assert!(matches!(result, Err(Error::MissingPrerequisite(_))));

    service
        .attach_map(
            "gs-1",
            &claim.id,
            MapData {
                geometry_ref: "geo-gp001-17".to_string(),
                area_mapped: Some(39.5),
            },
        )
        .await
        .unwrap();

    let forwarded = service
        .transition("gs-1", &claim.id, "ForwardedToSubdivision", Some("Map verified".into()))
        .await
        .unwrap();
    assert_eq!(forwarded.status(), ClaimStatus::ForwardedToSubdivision);
    assert_eq!(forwarded.history().len(), 2);
    assert!(forwarded.check_history().is_ok());
}

#[tokio::test]
async fn test_reject_then_terminal() {
    let service = service().await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Sita Hembram"))
        .await
        .unwrap();

    let rejected = service
        .transition("gs-1", &claim.id, "RejectedBySubdivision", Some("Duplicate".into()))
        .await
        .unwrap();
    assert!(rejected.is_terminal());

    for label in ["RecommendedByGramSabha", "RejectedBySubdivision", "FinalApproved"] {
        let result = service.transition("gs-1", &claim.id, label, None).await;
        assert!(matches!(result, Err(Error::TerminalState(_))));
    }

    let after = service.get_claim("gs-1", &claim.id).await.unwrap();
    assert_eq!(after.history().len(), 1);
}

#[tokio::test]
async fn test_aliases_resolve_through_vocabulary() {
    let service = service().await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Budhu Munda"))
        .await
        .unwrap();

    let updated = service
        .transition("gs-1", &claim.id, "VerifiedByGramSabha", None)
        .await
        .unwrap();
    assert_eq!(updated.status(), ClaimStatus::RecommendedByGramSabha);

    let unknown = service
        .transition("gs-1", &claim.id, "Escalated", None)
        .await;
    assert!(matches!(unknown, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_pipeline_moves_use_engine() {
    let service = service().await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Budhu Munda"))
        .await
        .unwrap();

    let verified = service
        .move_to_stage("gs-1", &claim.id, PipelineStage::VerifiedByGramSabha, None)
        .await
        .unwrap();
    assert_eq!(verified.status(), ClaimStatus::RecommendedByGramSabha);

    // Dropping into the column it is already in changes nothing
    let same = service
        .move_to_stage("gs-1", &claim.id, PipelineStage::VerifiedByGramSabha, None)
        .await
        .unwrap();
    assert_eq!(same.history().len(), 1);

    // Skipping the mapping step is refused by the engine
    let skipped = service
        .move_to_stage("gs-1", &claim.id, PipelineStage::FinalApproval, None)
        .await;
    assert!(matches!(skipped, Err(Error::InvalidTransition { .. })));

    let backwards = service
        .move_to_stage("gs-1", &claim.id, PipelineStage::Submitted, None)
        .await;
    assert!(matches!(backwards, Err(Error::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_stage_drops_racing_transitions_never_fail() {
    for _ in 0..20 {
        let service = Arc::new(service().await);
        let claim = service
            .create_claim("gs-1", new_claim(ClaimType::Individual, "Sita Hembram"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            let id = claim.id.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    service
                        .transition("gs-1", &id, "MappedByGramSabha", None)
                        .await
                } else {
                    service
                        .move_to_stage("gs-1", &id, PipelineStage::VerifiedByGramSabha, None)
                        .await
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let settled = service.get_claim("gs-1", &claim.id).await.unwrap();
        assert_eq!(settled.status(), ClaimStatus::MappedByGramSabha);
        assert!(settled.check_history().is_ok());
    }
}

#[tokio::test]
async fn test_officer_cannot_touch_claims_past_gram_sabha() {
    let service = service().await;
    let mut new = new_claim(ClaimType::Community, "Kuchidih Gram Sabha");
    new.map_data = Some(MapData {
        geometry_ref: "geo-1".to_string(),
        area_mapped: None,
    });
    let claim = service.create_claim("gs-1", new).await.unwrap();

    service
        .transition("gs-1", &claim.id, "MappedByGramSabha", None)
        .await
        .unwrap();
    service
        .transition("gs-1", &claim.id, "ForwardedToSubdivision", None)
        .await
        .unwrap();

    for status in ClaimStatus::ALL {
        if status == ClaimStatus::ForwardedToSubdivision {
            continue;
        }
        let result = service
            .transition("gs-1", &claim.id, status.as_str(), None)
            .await;
        assert!(
            matches!(
                result,
                Err(Error::InvalidTransition { .. }) | Err(Error::TerminalState(_))
            ),
            "{} should be refused",
            status
        );
    }

    // Same status stays an idempotent no-op
    let same = service
        .transition("gs-1", &claim.id, "ForwardedToSubdivision", None)
        .await
        .unwrap();
    assert_eq!(same.history().len(), 2);

    // The subdivision tier picks it up from here
    let reviewer = Actor::new("SDLC Ghatshila", ReviewTier::Subdivision);
    let reviewed = service
        .store()
        .apply_status(&claim.id, ClaimStatus::UnderSubdivisionReview, &reviewer, None)
        .await
        .unwrap();
    assert_eq!(reviewed.history().last().unwrap().actor, "SDLC Ghatshila");
}

#[tokio::test]
async fn test_allowed_transitions_for_new_claim() {
    let service = service().await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Ramesh Oraon"))
        .await
        .unwrap();

    let allowed = service.allowed_transitions("gs-1", &claim.id).await.unwrap();
    assert_eq!(
        allowed,
        vec![
            ClaimStatus::RecommendedByGramSabha,
            ClaimStatus::MappedByGramSabha,
            ClaimStatus::RejectedBySubdivision,
        ]
    );
}

#[tokio::test]
async fn test_statistics_scoped_to_jurisdiction() {
    let service = service().await;
    for i in 0..4 {
        service
            .create_claim("gs-1", new_claim(ClaimType::Individual, &format!("A{}", i)))
            .await
            .unwrap();
    }
    service
        .create_claim("gs-2", new_claim(ClaimType::Community, "B"))
        .await
        .unwrap();

    let stats = service.statistics("gs-1", None).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.submitted, 4);
    assert_eq!(stats.success_rate, 0.0);

    let foreign = service.statistics("gs-1", Some("GP002")).await;
    assert!(matches!(foreign, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn test_list_claims_filters_and_scopes() {
    let service = service().await;
    let first = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Ramesh Oraon"))
        .await
        .unwrap();
    service
        .create_claim("gs-1", new_claim(ClaimType::Community, "Bhimpur Gram Sabha"))
        .await
        .unwrap();
    service
        .create_claim("gs-2", new_claim(ClaimType::Individual, "Elsewhere"))
        .await
        .unwrap();

    let all = service
        .list_claims("gs-1", &ClaimQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|c| c.gp_code == "GP001"));

    let individual = service
        .list_claims(
            "gs-1",
            &ClaimQuery {
                claim_type: Some(ClaimType::Individual),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(individual.len(), 1);
    assert_eq!(individual[0].id, first.id);

    let foreign = service
        .list_claims(
            "gs-1",
            &ClaimQuery {
                jurisdiction: Some("GP002".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(foreign, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn test_profile_update_keeps_jurisdiction() {
    let service = service().await;

    let updated = service
        .update_profile(
            "gs-1",
            ProfileUpdate {
                email: Some("new.address@gs.example.in".to_string()),
                assigned_village: Some("Kuchidih".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.email, "new.address@gs.example.in");
    assert_eq!(updated.assigned_village, "Kuchidih");
    assert_eq!(updated.gp_code, "GP001");
    assert_eq!(service.profile("gs-1").await.unwrap(), updated);

    let unknown = service.profile("nobody").await;
    assert!(matches!(unknown, Err(Error::Forbidden(_))));
}

/// Repository whose claim writes can be switched off
#[derive(Default)]
struct FlakyRepository {
    inner: MemoryRepository,
    failing: AtomicBool,
}

#[async_trait]
impl ClaimRepository for FlakyRepository {
    async fn load_claims(&self) -> fra_common::Result<Vec<Claim>> {
        self.inner.load_claims().await
    }

    async fn save_claim(&self, claim: &Claim) -> fra_common::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Storage("disk unavailable".into()));
        }
        self.inner.save_claim(claim).await
    }

    async fn load_officers(&self) -> fra_common::Result<Vec<OfficerProfile>> {
        self.inner.load_officers().await
    }

    async fn save_officer(&self, officer: &OfficerProfile) -> fra_common::Result<()> {
        self.inner.save_officer(officer).await
    }
}

#[tokio::test]
async fn test_failed_write_leaves_claim_unchanged() {
    let repository = Arc::new(FlakyRepository::default());
    let service = service_with_officers(repository.clone()).await;
    let claim = service
        .create_claim("gs-1", new_claim(ClaimType::Individual, "Ramesh Oraon"))
        .await
        .unwrap();

    repository.failing.store(true, Ordering::SeqCst);
    let result = service
        .transition("gs-1", &claim.id, "RecommendedByGramSabha", None)
        .await;
    assert!(matches!(result, Err(Error::Storage(_))));

    let after = service.get_claim("gs-1", &claim.id).await.unwrap();
    assert_eq!(after.status(), ClaimStatus::Submitted);
    assert!(after.history().is_empty());

    repository.failing.store(false, Ordering::SeqCst);
    let retried = service
        .transition("gs-1", &claim.id, "RecommendedByGramSabha", None)
        .await
        .unwrap();
    assert_eq!(retried.history().len(), 1);
}

#[tokio::test]
async fn test_service_reload_from_repository() {
    let repository: Arc<dyn ClaimRepository> = Arc::new(MemoryRepository::new());
    let claim_id = {
        let service = service_with_officers(repository.clone()).await;
        let claim = service
            .create_claim("gs-1", new_claim(ClaimType::Individual, "Ramesh Oraon"))
            .await
            .unwrap();
        service
            .transition("gs-1", &claim.id, "RecommendedByGramSabha", None)
            .await
            .unwrap();
        claim.id
    };

    let reloaded = ClaimService::load(repository, StatusVocabulary::default())
        .await
        .unwrap();
    let claim = reloaded.get_claim("gs-1", &claim_id).await.unwrap();
    assert_eq!(claim.status(), ClaimStatus::RecommendedByGramSabha);
}
