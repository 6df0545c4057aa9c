//! Startup seed data
//!
//! A seed file is a JSON document `{ "officers": [...], "claims": [...] }`.
//! Records whose id already exists in the repository are skipped, so a seed
//! can be applied on every start.

use anyhow::{Context, Result};
use claim_lifecycle::{Claim, ClaimService, OfficerProfile};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub officers: Vec<OfficerProfile>,

    #[serde(default)]
    pub claims: Vec<Claim>,
}

/// Counts of records actually added
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub officers: usize,
    pub claims: usize,
}

pub fn load_seed(path: &Path) -> Result<SeedData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file: {}", path.display()))
}

pub async fn apply_seed(service: &ClaimService, seed: SeedData) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for officer in seed.officers {
        if service.officer(&officer.id).await.is_ok() {
            debug!("Officer {} already present, skipping", officer.id);
            continue;
        }
        let id = officer.id.clone();
        service
            .register_officer(officer)
            .await
            .with_context(|| format!("Failed to seed officer {}", id))?;
        report.officers += 1;
    }

    for claim in seed.claims {
        if service.store().contains(&claim.id).await {
            debug!("Claim {} already present, skipping", claim.id);
            continue;
        }
        let id = claim.id.clone();
        service
            .import_claim(claim)
            .await
            .with_context(|| format!("Failed to seed claim {}", id))?;
        report.claims += 1;
    }

    info!(
        "Seeded {} officers and {} claims",
        report.officers, report.claims
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_lifecycle::MemoryRepository;
    use fra_common::{ClaimStatus, StatusVocabulary};
    use std::io::Write;
    use std::sync::Arc;

    const SEED: &str = r#"{
        "officers": [{
            "id": "gs-1",
            "gpCode": "GP001",
            "gpName": "Bhimpur",
            "subdivision": "Ghatshila",
            "district": "East Singhbhum",
            "name": "Anita Murmu",
            "email": "anita@gs.example.in",
            "contactNumber": "9123456780"
        }],
        "claims": [{
            "id": "FRA-2024-001",
            "claimType": "Individual",
            "gpCode": "GP001",
            "claimant": { "name": "Ramesh Oraon" },
            "landDetails": { "areaClaimed": 1.5, "village": "Bhimpur" },
            "createdAt": "2024-03-01T10:00:00Z",
            "status": "RecommendedByGramSabha",
            "history": [{
                "from": "Submitted",
                "to": "RecommendedByGramSabha",
                "actor": "Anita Murmu (GP001)",
                "timestamp": "2024-03-05T10:00:00Z"
            }]
        }]
    }"#;

    fn seed_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_seed_is_applied_once() {
        let file = seed_file(SEED);
        let service = ClaimService::new(
            Arc::new(MemoryRepository::new()),
            StatusVocabulary::default(),
        );

        let first = apply_seed(&service, load_seed(file.path()).unwrap())
            .await
            .unwrap();
        assert_eq!(first, SeedReport { officers: 1, claims: 1 });

        let second = apply_seed(&service, load_seed(file.path()).unwrap())
            .await
            .unwrap();
        assert_eq!(second, SeedReport::default());

        let claim = service.get_claim("gs-1", "FRA-2024-001").await.unwrap();
        assert_eq!(claim.status(), ClaimStatus::RecommendedByGramSabha);
    }

    #[tokio::test]
    async fn test_inconsistent_seed_claim_rejected() {
        let broken = SEED.replace(
            r#""status": "RecommendedByGramSabha""#,
            r#""status": "FinalApproved""#,
        );
        let file = seed_file(&broken);
        let service = ClaimService::new(
            Arc::new(MemoryRepository::new()),
            StatusVocabulary::default(),
        );

        let result = apply_seed(&service, load_seed(file.path()).unwrap()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_seed_file() {
        let result = load_seed(Path::new("/nonexistent/seed.json"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read seed file"));
    }
}
