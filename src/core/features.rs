use crate::core::error::MatchError;
use crate::models::{FeatureKind, Listing, PractitionerProfile, StructureType};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// A single feature value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub fit: f64,
}

/// Features that carry a constraint for this practitioner, in declaration order.
///
/// A feature the practitioner never expressed a preference for is absent,
/// so it weighs neither for nor against the listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    features: Vec<Feature>,
}

impl FeatureVector {
    pub fn get(&self, kind: FeatureKind) -> Option<f64> {
        self.features.iter().find(|f| f.kind == kind).map(|f| f.fit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn push(&mut self, kind: FeatureKind, fit: f64) {
        self.features.push(Feature { kind, fit: fit.clamp(0.0, 1.0) });
    }
}

/// Practitioner intent, gathered once per request from alerts, recent
/// searches and declared preferences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PractitionerSignals {
    professions: Vec<String>,
    cities: HashSet<String>,
    budget: Option<u32>,
    min_size: Option<u32>,
    structures: HashSet<StructureType>,
    has_intent: bool,
}

impl PractitionerSignals {
    pub fn from_profile(profile: &PractitionerProfile, history_depth: usize) -> Self {
        let mut signals = Self::default();
        let mut intent = !profile.preferences.is_empty();

        signals.add_profession(&profile.profession);

        if let Some(city) = &profile.preferences.preferred_city {
            signals.cities.insert(normalize(city));
        }
        signals.budget = profile.preferences.max_budget;
        signals.min_size = profile.preferences.min_size;
        signals.structures.extend(profile.preferences.preferred_structure_type);

        for alert in profile.active_alerts() {
            intent = true;
            if let Some(city) = &alert.city {
                signals.cities.insert(normalize(city));
            }
            if let Some(profession) = &alert.profession {
                signals.add_profession(profession);
            }
            signals.structures.extend(alert.structure_type);
            // Strictest budget, most demanding size
            signals.budget = min_option(signals.budget, alert.max_rent);
            signals.min_size = max_option(signals.min_size, alert.min_size);
        }

        for search in profile.recent_searches(history_depth) {
            if search.is_blank() {
                continue;
            }
            intent = true;
            if let Some(city) = &search.city {
                signals.cities.insert(normalize(city));
            }
            if let Some(profession) = &search.profession {
                signals.add_profession(profession);
            }
            signals.structures.extend(search.structure_type);
        }

        signals.has_intent = intent;
        signals
    }

    /// False when nothing but listing quality can be scored
    pub fn has_intent(&self) -> bool {
        self.has_intent
    }

    pub fn professions(&self) -> &[String] {
        &self.professions
    }

    pub fn budget(&self) -> Option<u32> {
        self.budget
    }

    pub fn min_size(&self) -> Option<u32> {
        self.min_size
    }

    fn add_profession(&mut self, profession: &str) {
        let profession = normalize(profession);
        if !profession.is_empty() && !self.professions.contains(&profession) {
            self.professions.push(profession);
        }
    }
}

/// Derives the feature vector of a (practitioner, listing) pair
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    novelty_window: Duration,
    rent_tolerance: f64,
    size_tolerance: f64,
}

impl FeatureExtractor {
    pub fn new(novelty_window: Duration, rent_tolerance: f64, size_tolerance: f64) -> Self {
        Self {
            novelty_window,
            rent_tolerance,
            size_tolerance,
        }
    }

    /// Extract the constrained features of `listing` for these signals.
    ///
    /// Listings without a rent or a size cannot be scored.
    pub fn extract(
        &self,
        signals: &PractitionerSignals,
        listing: &Listing,
        now: DateTime<Utc>,
    ) -> Result<FeatureVector, MatchError> {
        let rent = listing.monthly_rent.ok_or_else(|| MatchError::MalformedListing {
            listing_id: listing.id.clone(),
            field: "monthly_rent",
        })?;
        let size = listing.size.ok_or_else(|| MatchError::MalformedListing {
            listing_id: listing.id.clone(),
            field: "size",
        })?;

        let mut features = FeatureVector::default();

        if signals.has_intent() {
            if !signals.professions.is_empty() {
                let fit = listing
                    .profiles_searched
                    .iter()
                    .any(|searched| signals.professions.iter().any(|p| profession_matches(p, searched)));
                features.push(FeatureKind::Profession, indicator(fit));
            }

            if !signals.cities.is_empty() {
                features.push(
                    FeatureKind::City,
                    indicator(signals.cities.contains(&normalize(&listing.city))),
                );
            }

            if let Some(budget) = signals.budget {
                features.push(FeatureKind::Rent, rent_fit(rent, budget, self.rent_tolerance));
            }

            if let Some(min_size) = signals.min_size {
                features.push(FeatureKind::Size, size_fit(size, min_size, self.size_tolerance));
            }

            if !signals.structures.is_empty() {
                let fit = listing
                    .structure_type
                    .map(|structure| signals.structures.contains(&structure))
                    .unwrap_or(false);
                features.push(FeatureKind::Structure, indicator(fit));
            }
        }

        let fresh = listing
            .created_at
            .map(|created| now.signed_duration_since(created) <= self.novelty_window)
            .unwrap_or(false);
        features.push(FeatureKind::Novelty, indicator(fresh));
        features.push(FeatureKind::Featured, indicator(listing.is_featured));

        Ok(features)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(Duration::days(14), 0.5, 0.5)
    }
}

/// Loose profession comparison: case-insensitive containment either way
pub fn profession_matches(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// 1 within budget, then decays linearly with the relative overshoot
#[inline]
pub fn rent_fit(rent: u32, budget: u32, tolerance: f64) -> f64 {
    if rent <= budget {
        return 1.0;
    }
    if budget == 0 || tolerance <= 0.0 {
        return 0.0;
    }
    let overshoot = (rent - budget) as f64 / budget as f64;
    (1.0 - overshoot / tolerance).max(0.0)
}

/// 1 at or above the required size, then decays with the relative shortfall
#[inline]
pub fn size_fit(size: u32, min_size: u32, tolerance: f64) -> f64 {
    if size >= min_size {
        return 1.0;
    }
    if tolerance <= 0.0 {
        return 0.0;
    }
    let shortfall = (min_size - size) as f64 / min_size as f64;
    (1.0 - shortfall / tolerance).max(0.0)
}

pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[inline]
fn indicator(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn min_option(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_option(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertCriteria, SearchEntry};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn create_listing(city: &str, rent: u32, size: u32) -> Listing {
        Listing {
            id: "l1".to_string(),
            city: city.to_string(),
            structure_type: Some(StructureType::Msp),
            size: Some(size),
            monthly_rent: Some(rent),
            profiles_searched: vec!["Kinésithérapeute".to_string()],
            created_at: Some(now() - Duration::days(30)),
            ..Listing::default()
        }
    }

    fn create_profile() -> PractitionerProfile {
        PractitionerProfile {
            user_id: "u1".to_string(),
            profession: "kinésithérapeute".to_string(),
            alerts: vec![AlertCriteria {
                id: "a1".to_string(),
                city: Some("Lyon".to_string()),
                structure_type: Some(StructureType::Msp),
                max_rent: Some(1000),
                min_size: Some(20),
                active: true,
                ..AlertCriteria::default()
            }],
            ..PractitionerProfile::default()
        }
    }

    #[test]
    fn test_rent_fit_decay() {
        assert_eq!(rent_fit(800, 1000, 0.5), 1.0);
        assert_eq!(rent_fit(1000, 1000, 0.5), 1.0);
        assert!((rent_fit(1250, 1000, 0.5) - 0.5).abs() < 1e-9);
        assert_eq!(rent_fit(1500, 1000, 0.5), 0.0);
        assert_eq!(rent_fit(3000, 1000, 0.5), 0.0);
    }

    #[test]
    fn test_size_fit_decay() {
        assert_eq!(size_fit(30, 20, 0.5), 1.0);
        assert!((size_fit(15, 20, 0.5) - 0.5).abs() < 1e-9);
        assert_eq!(size_fit(5, 20, 0.5), 0.0);
    }

    #[test]
    fn test_profession_matches_loosely() {
        assert!(profession_matches("Kiné", "kiné ostéopathe"));
        assert!(profession_matches("Infirmier libéral", "infirmier"));
        assert!(!profession_matches("Dentiste", "Orthophoniste"));
        assert!(!profession_matches("", "Orthophoniste"));
    }

    #[test]
    fn test_signals_take_strictest_budget() {
        let mut profile = create_profile();
        profile.preferences.max_budget = Some(800);
        profile.alerts.push(AlertCriteria {
            id: "a2".to_string(),
            max_rent: Some(1200),
            min_size: Some(35),
            active: true,
            ..AlertCriteria::default()
        });

        let signals = PractitionerSignals::from_profile(&profile, 20);

        assert_eq!(signals.budget(), Some(800));
        assert_eq!(signals.min_size(), Some(35));
    }

    #[test]
    fn test_inactive_alerts_ignored() {
        let mut profile = create_profile();
        profile.alerts[0].active = false;

        let signals = PractitionerSignals::from_profile(&profile, 20);

        assert!(!signals.has_intent());
        assert_eq!(signals.budget(), None);
    }

    #[test]
    fn test_search_history_adds_cities() {
        let mut profile = create_profile();
        profile.alerts.clear();
        profile.searches = vec![SearchEntry {
            city: Some("Nantes".to_string()),
            radius: Some(10),
            structure_type: None,
            profession: None,
            searched_at: now(),
        }];

        let signals = PractitionerSignals::from_profile(&profile, 20);
        let features = FeatureExtractor::default()
            .extract(&signals, &create_listing(" nantes ", 900, 25), now())
            .unwrap();

        assert_eq!(features.get(FeatureKind::City), Some(1.0));
        assert_eq!(features.get(FeatureKind::Rent), None);
    }

    #[test]
    fn test_full_feature_vector() {
        let signals = PractitionerSignals::from_profile(&create_profile(), 20);
        let features = FeatureExtractor::default()
            .extract(&signals, &create_listing("Lyon", 900, 25), now())
            .unwrap();

        assert_eq!(features.get(FeatureKind::Profession), Some(1.0));
        assert_eq!(features.get(FeatureKind::City), Some(1.0));
        assert_eq!(features.get(FeatureKind::Rent), Some(1.0));
        assert_eq!(features.get(FeatureKind::Size), Some(1.0));
        assert_eq!(features.get(FeatureKind::Structure), Some(1.0));
        assert_eq!(features.get(FeatureKind::Novelty), Some(0.0));
        assert_eq!(features.get(FeatureKind::Featured), Some(0.0));
    }

    #[test]
    fn test_fallback_only_passive_features() {
        let profile = PractitionerProfile {
            user_id: "u2".to_string(),
            profession: "Dentiste".to_string(),
            ..PractitionerProfile::default()
        };
        let signals = PractitionerSignals::from_profile(&profile, 20);
        let mut listing = create_listing("Lyon", 900, 25);
        listing.created_at = Some(now() - Duration::days(2));

        let features = FeatureExtractor::default().extract(&signals, &listing, now()).unwrap();

        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f.kind.is_passive()));
        assert_eq!(features.get(FeatureKind::Novelty), Some(1.0));
    }

    #[test]
    fn test_missing_rent_is_malformed() {
        let signals = PractitionerSignals::from_profile(&create_profile(), 20);
        let mut listing = create_listing("Lyon", 900, 25);
        listing.monthly_rent = None;

        let err = FeatureExtractor::default().extract(&signals, &listing, now()).unwrap_err();

        assert_eq!(
            err,
            MatchError::MalformedListing {
                listing_id: "l1".to_string(),
                field: "monthly_rent",
            }
        );
    }
}
