use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Classification of a listing: multi-professional health center or single office
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    #[serde(rename = "MSP", alias = "msp")]
    Msp,
    #[serde(rename = "Cabinet", alias = "cabinet")]
    Cabinet,
}

impl StructureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureType::Msp => "MSP",
            StructureType::Cabinet => "Cabinet",
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "msp" => Ok(StructureType::Msp),
            "cabinet" => Ok(StructureType::Cabinet),
            other => Err(format!("unknown structure type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Locataire,
    Proprietaire,
    Admin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    #[default]
    Pending,
    Rejected,
}

/// Preferences a practitioner declared at registration.
///
/// They behave like one more alert that is always active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredPreferences {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub preferred_city: Option<String>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub max_budget: Option<u32>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub min_size: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub preferred_structure_type: Option<StructureType>,
}

impl DeclaredPreferences {
    pub fn is_empty(&self) -> bool {
        self.preferred_city.is_none()
            && self.max_budget.is_none()
            && self.min_size.is_none()
            && self.preferred_structure_type.is_none()
    }
}

/// Authenticated account as returned by the marketplace backend (`/api/auth/me`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub profession: String,
    pub user_type: UserType,
    #[serde(default)]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(flatten)]
    pub preferences: DeclaredPreferences,
}

impl UserAccount {
    /// Explicit status wins; the legacy boolean flag is the fallback
    pub fn verification(&self) -> VerificationStatus {
        match (self.verification_status, self.is_verified) {
            (Some(status), _) => status,
            (None, Some(true)) => VerificationStatus::Verified,
            _ => VerificationStatus::Pending,
        }
    }
}

/// Saved search criteria. Every unset field is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertCriteria {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub radius: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub structure_type: Option<StructureType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub profession: Option<String>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub max_rent: Option<u32>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub min_size: Option<u32>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One entry of a practitioner's search history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub radius: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub structure_type: Option<StructureType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub profession: Option<String>,
    pub searched_at: DateTime<Utc>,
}

impl SearchEntry {
    pub fn is_blank(&self) -> bool {
        self.city.is_none() && self.structure_type.is_none() && self.profession.is_none()
    }
}

/// Office space offered by an owner.
///
/// Fields the matcher does not read are kept in `extra` so the listing can be
/// handed back to the frontend unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub structure_type: Option<StructureType>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub size: Option<u32>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub monthly_rent: Option<u32>,
    #[serde(default)]
    pub professionals_present: Vec<String>,
    #[serde(default)]
    pub profiles_searched: Vec<String>,
    #[serde(default)]
    pub equipments: Vec<String>,
    #[serde(default)]
    pub is_pmr_accessible: bool,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, alias = "is_archived")]
    pub archived: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-only snapshot of everything known about a practitioner for one request
#[derive(Debug, Clone, Default)]
pub struct PractitionerProfile {
    pub user_id: String,
    pub profession: String,
    pub verification: VerificationStatus,
    pub preferences: DeclaredPreferences,
    pub alerts: Vec<AlertCriteria>,
    pub favorites: HashSet<String>,
    pub applied: HashSet<String>,
    /// Most recent first
    pub searches: Vec<SearchEntry>,
}

impl PractitionerProfile {
    pub fn from_account(account: UserAccount) -> Self {
        Self {
            verification: account.verification(),
            user_id: account.id,
            profession: account.profession,
            preferences: account.preferences,
            ..Self::default()
        }
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = &AlertCriteria> {
        self.alerts.iter().filter(|alert| alert.active)
    }

    pub fn recent_searches(&self, depth: usize) -> impl Iterator<Item = &SearchEntry> {
        self.searches.iter().take(depth)
    }

    /// Whether the listing was already favorited or applied to
    pub fn has_acted_on(&self, listing_id: &str) -> bool {
        self.favorites.contains(listing_id) || self.applied.contains(listing_id)
    }
}

/// Favorite record from the marketplace backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub listing_id: String,
}

/// Application record from the marketplace backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub listing_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Features compared between a practitioner and a listing, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Profession,
    City,
    Rent,
    Size,
    Structure,
    Novelty,
    Featured,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 7] = [
        FeatureKind::Profession,
        FeatureKind::City,
        FeatureKind::Rent,
        FeatureKind::Size,
        FeatureKind::Structure,
        FeatureKind::Novelty,
        FeatureKind::Featured,
    ];

    /// Listing-quality signals that do not depend on practitioner intent
    pub fn is_passive(&self) -> bool {
        matches!(self, FeatureKind::Novelty | FeatureKind::Featured)
    }
}

/// Scoring weights, one per feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub profession: f64,
    pub city: f64,
    pub rent: f64,
    pub size: f64,
    pub structure: f64,
    pub novelty: f64,
    pub featured: f64,
}

impl ScoringWeights {
    pub fn weight(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Profession => self.profession,
            FeatureKind::City => self.city,
            FeatureKind::Rent => self.rent,
            FeatureKind::Size => self.size,
            FeatureKind::Structure => self.structure,
            FeatureKind::Novelty => self.novelty,
            FeatureKind::Featured => self.featured,
        }
    }

    pub fn total(&self) -> f64 {
        FeatureKind::ALL.iter().map(|kind| self.weight(*kind)).sum()
    }

    /// Weights must be finite, non-negative and not all zero
    pub fn validate(&self) -> Result<(), String> {
        for kind in FeatureKind::ALL {
            let weight = self.weight(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("weight for {:?} must be a non-negative number, got {}", kind, weight));
            }
        }
        if self.total() <= 0.0 {
            return Err("scoring weights must not all be zero".to_string());
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            profession: 0.25,
            city: 0.25,
            rent: 0.20,
            size: 0.10,
            structure: 0.10,
            novelty: 0.05,
            featured: 0.05,
        }
    }
}

/// Scored recommendation as served to the frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub listing: Listing,
    pub score: u8,
    pub reasons: Vec<String>,
}

fn default_true() -> bool { true }

/// Treat missing, null and blank strings as unset, parse the rest
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Treat missing, null and non-positive numbers as unset
fn positive_or_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| *v > 0)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX)))
}
