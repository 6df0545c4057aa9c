//! Data models for FRA claims and officers

use chrono::{DateTime, Utc};
use fra_common::{ClaimStatus, Error, Result};
use serde::{Deserialize, Serialize};

/// IFR or CFR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimType {
    Individual,
    Community,
}

impl ClaimType {
    /// Forest-rights category abbreviation used on the dashboard
    pub fn category(self) -> &'static str {
        match self {
            ClaimType::Individual => "IFR",
            ClaimType::Community => "CFR",
        }
    }
}

/// Person or community filing the claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claimant {
    pub name: String,

    #[serde(default)]
    pub contact: String,

    #[serde(default)]
    pub address: String,
}

/// Land under claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandDetails {
    /// Area claimed in hectares
    pub area_claimed: f64,

    pub village: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_use: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reference to the surveyed boundary of the claimed land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    /// Identifier of the geometry held by the GIS service
    pub geometry_ref: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_mapped: Option<f64>,
}

impl MapData {
    pub fn validate(&self) -> Result<()> {
        if self.geometry_ref.trim().is_empty() {
            return Err(Error::Validation("geometryRef must not be empty".into()));
        }
        if let Some(area) = self.area_mapped {
            if !area.is_finite() || area <= 0.0 {
                return Err(Error::Validation("areaMapped must be positive".into()));
            }
        }
        Ok(())
    }
}

/// One applied lifecycle transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub actor: String,
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// A forest-rights claim.
///
/// `status` is always the `to` of the last history entry, or `Submitted`
/// while the history is empty. Both are private so that only
/// [`Claim::record_transition`] can move them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub claim_type: ClaimType,
    pub gp_code: String,
    pub claimant: Claimant,
    pub land_details: LandDetails,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_data: Option<MapData>,

    pub created_at: DateTime<Utc>,

    status: ClaimStatus,

    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl Claim {
    /// Create a new claim in `Submitted`
    pub fn new(
        id: String,
        claim_type: ClaimType,
        gp_code: String,
        claimant: Claimant,
        land_details: LandDetails,
    ) -> Self {
        Self {
            id,
            claim_type,
            gp_code,
            claimant,
            land_details,
            map_data: None,
            created_at: Utc::now(),
            status: ClaimStatus::Submitted,
            history: Vec::new(),
        }
    }

    /// Rebuild a claim from a recorded history; the status is derived from it
    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Result<Self> {
        self.status = history
            .last()
            .map(|entry| entry.to)
            .unwrap_or(ClaimStatus::Submitted);
        self.history = history;
        self.check_history()?;
        Ok(self)
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Append a transition. Callers validate it first.
    pub(crate) fn record_transition(
        &mut self,
        to: ClaimStatus,
        actor: &str,
        remarks: Option<String>,
        timestamp: DateTime<Utc>,
    ) {
        self.history.push(HistoryEntry {
            from: self.status,
            to,
            actor: actor.to_string(),
            timestamp,
            remarks,
        });
        self.status = to;
    }

    /// Verify the history chain starts at `Submitted`, is contiguous, takes
    /// only lifecycle edges, and ends at the current status
    pub fn check_history(&self) -> Result<()> {
        let mut expected = ClaimStatus::Submitted;
        for (index, entry) in self.history.iter().enumerate() {
            if entry.from != expected {
                return Err(Error::Validation(format!(
                    "Claim {} history entry {} starts at {} but previous state is {}",
                    self.id, index, entry.from, expected
                )));
            }
            if !entry.from.can_step_to(entry.to) {
                return Err(Error::Validation(format!(
                    "Claim {} history entry {} moves {} -> {}, which is not a lifecycle transition",
                    self.id, index, entry.from, entry.to
                )));
            }
            expected = entry.to;
        }

        if self.status != expected {
            return Err(Error::Validation(format!(
                "Claim {} has status {} but history ends at {}",
                self.id, self.status, expected
            )));
        }

        Ok(())
    }
}

/// Fields an officer supplies when filing a claim
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClaim {
    pub claim_type: ClaimType,
    pub claimant: Claimant,
    pub land_details: LandDetails,

    #[serde(default)]
    pub map_data: Option<MapData>,
}

impl NewClaim {
    pub fn validate(&self) -> Result<()> {
        validate_claimant(&self.claimant)?;
        validate_land(&self.land_details)?;
        if let Some(map) = &self.map_data {
            map.validate()?;
        }
        Ok(())
    }
}

/// Partial update of the descriptive parts of an editable claim
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDetailsUpdate {
    #[serde(default)]
    pub claimant: Option<Claimant>,

    #[serde(default)]
    pub land_details: Option<LandDetails>,
}

impl ClaimDetailsUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.claimant.is_none() && self.land_details.is_none() {
            return Err(Error::Validation("Nothing to update".into()));
        }
        if let Some(claimant) = &self.claimant {
            validate_claimant(claimant)?;
        }
        if let Some(land) = &self.land_details {
            validate_land(land)?;
        }
        Ok(())
    }
}

fn validate_claimant(claimant: &Claimant) -> Result<()> {
    if claimant.name.trim().is_empty() {
        return Err(Error::Validation("Claimant name must not be empty".into()));
    }
    Ok(())
}

fn validate_land(land: &LandDetails) -> Result<()> {
    if !land.area_claimed.is_finite() || land.area_claimed <= 0.0 {
        return Err(Error::Validation("areaClaimed must be positive".into()));
    }
    if land.village.trim().is_empty() {
        return Err(Error::Validation("Village must not be empty".into()));
    }
    Ok(())
}

/// Gram Sabha officer and their jurisdiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerProfile {
    pub id: String,

    // Jurisdiction assignment, fixed for the lifetime of the profile
    pub gp_code: String,
    pub gp_name: String,
    pub subdivision: String,
    pub district: String,

    pub name: String,
    pub email: String,
    pub contact_number: String,

    #[serde(default)]
    pub assigned_village: String,
}

/// Self-service changes an officer may make to their own profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub contact_number: Option<String>,

    #[serde(default)]
    pub assigned_village: Option<String>,
}

impl OfficerProfile {
    /// Apply a self-service update, returning the new profile
    pub fn updated(&self, update: ProfileUpdate) -> Result<OfficerProfile> {
        let mut next = self.clone();

        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Validation("Name must not be empty".into()));
            }
            next.name = name.to_string();
        }

        if let Some(email) = update.email {
            let email = email.trim();
            if !is_valid_email(email) {
                return Err(Error::Validation(format!("Invalid email address: {}", email)));
            }
            next.email = email.to_string();
        }

        if let Some(contact) = update.contact_number {
            let contact = contact.trim();
            if !is_valid_contact_number(contact) {
                return Err(Error::Validation(format!(
                    "Invalid contact number: {}",
                    contact
                )));
            }
            next.contact_number = contact.to_string();
        }

        if let Some(village) = update.assigned_village {
            next.assigned_village = village.trim().to_string();
        }

        Ok(next)
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// Ten digits, optionally prefixed with `+91`
fn is_valid_contact_number(contact: &str) -> bool {
    let digits = contact.strip_prefix("+91").unwrap_or(contact).trim();
    digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit())
}
