use crate::core::features::{normalize, profession_matches};
use crate::models::{AlertCriteria, Listing, PractitionerProfile};

/// Check whether a listing may be recommended to this practitioner
///
/// Archived listings and listings the practitioner already favorited or
/// applied to are never recommended.
#[inline]
pub fn is_eligible(listing: &Listing, profile: &PractitionerProfile) -> bool {
    !listing.archived && !profile.has_acted_on(&listing.id)
}

/// Loose profession pre-filter.
///
/// A listing that does not say which profiles it looks for stays in.
#[inline]
pub fn matches_profession_loosely(listing: &Listing, professions: &[String]) -> bool {
    professions.is_empty()
        || listing.profiles_searched.is_empty()
        || listing
            .profiles_searched
            .iter()
            .any(|searched| professions.iter().any(|p| profession_matches(p, searched)))
}

/// Gather the listings eligible for scoring.
///
/// `prefilter` holds the professions used to prune the catalog, when enabled.
pub fn collect_candidates(
    profile: &PractitionerProfile,
    listings: Vec<Listing>,
    prefilter: Option<&[String]>,
) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|listing| is_eligible(listing, profile))
        .filter(|listing| prefilter.map_or(true, |professions| matches_profession_loosely(listing, professions)))
        .collect()
}

/// Check a listing against every criterion set on an alert
pub fn satisfies_alert(listing: &Listing, alert: &AlertCriteria) -> bool {
    if let Some(city) = &alert.city {
        if !normalize(&listing.city).contains(&normalize(city)) {
            return false;
        }
    }

    if let Some(structure) = alert.structure_type {
        if listing.structure_type != Some(structure) {
            return false;
        }
    }

    if let Some(max_rent) = alert.max_rent {
        if !listing.monthly_rent.is_some_and(|rent| rent <= max_rent) {
            return false;
        }
    }

    if let Some(min_size) = alert.min_size {
        if !listing.size.is_some_and(|size| size >= min_size) {
            return false;
        }
    }

    if let Some(profession) = &alert.profession {
        if !listing
            .profiles_searched
            .iter()
            .any(|searched| profession_matches(profession, searched))
        {
            return false;
        }
    }

    true
}

/// Listings published after the alert was created that satisfy it.
///
/// Listings or alerts without a creation date are kept.
pub fn new_listings_for_alert(alert: &AlertCriteria, listings: Vec<Listing>) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|listing| !listing.archived)
        .filter(|listing| satisfies_alert(listing, alert))
        .filter(|listing| match (listing.created_at, alert.created_at) {
            (Some(listed), Some(created)) => listed > created,
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StructureType;
    use chrono::{DateTime, Duration, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn create_test_listing(id: &str, city: &str, rent: u32, size: u32) -> Listing {
        Listing {
            id: id.to_string(),
            city: city.to_string(),
            structure_type: Some(StructureType::Msp),
            size: Some(size),
            monthly_rent: Some(rent),
            profiles_searched: vec!["Infirmier".to_string()],
            created_at: Some(now()),
            ..Listing::default()
        }
    }

    fn create_test_profile() -> PractitionerProfile {
        PractitionerProfile {
            user_id: "u1".to_string(),
            profession: "Infirmier".to_string(),
            favorites: ["fav".to_string()].into_iter().collect(),
            applied: ["applied".to_string()].into_iter().collect(),
            ..PractitionerProfile::default()
        }
    }

    #[test]
    fn test_acted_on_listings_excluded() {
        let profile = create_test_profile();
        let listings = vec![
            create_test_listing("fav", "Lyon", 800, 20),
            create_test_listing("applied", "Lyon", 800, 20),
            create_test_listing("fresh", "Lyon", 800, 20),
        ];

        let candidates = collect_candidates(&profile, listings, None);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "fresh");
    }

    #[test]
    fn test_archived_listing_excluded() {
        let profile = create_test_profile();
        let mut archived = create_test_listing("old", "Lyon", 800, 20);
        archived.archived = true;

        assert!(!is_eligible(&archived, &profile));
    }

    #[test]
    fn test_profession_prefilter() {
        let profile = create_test_profile();
        let mut dentist_only = create_test_listing("d", "Lyon", 800, 20);
        dentist_only.profiles_searched = vec!["Dentiste".to_string()];
        let mut open = create_test_listing("o", "Lyon", 800, 20);
        open.profiles_searched.clear();
        let listings = vec![dentist_only, open, create_test_listing("n", "Lyon", 800, 20)];
        let professions = vec!["infirmier".to_string()];

        let candidates = collect_candidates(&profile, listings, Some(&professions));

        let ids: Vec<&str> = candidates.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["o", "n"]);
    }

    #[test]
    fn test_alert_criteria_all_apply() {
        let alert = AlertCriteria {
            id: "a".to_string(),
            city: Some("lyon".to_string()),
            structure_type: Some(StructureType::Msp),
            max_rent: Some(900),
            min_size: Some(20),
            profession: Some("infirmier".to_string()),
            active: true,
            ..AlertCriteria::default()
        };

        assert!(satisfies_alert(&create_test_listing("1", "Lyon 3e", 900, 20), &alert));
        assert!(!satisfies_alert(&create_test_listing("2", "Paris", 900, 20), &alert));
        assert!(!satisfies_alert(&create_test_listing("3", "Lyon", 901, 20), &alert));
        assert!(!satisfies_alert(&create_test_listing("4", "Lyon", 900, 19), &alert));
    }

    #[test]
    fn test_wildcard_alert_matches_everything() {
        let alert = AlertCriteria {
            id: "a".to_string(),
            active: true,
            ..AlertCriteria::default()
        };

        assert!(satisfies_alert(&create_test_listing("1", "Brest", 2000, 10), &alert));
    }

    #[test]
    fn test_new_listings_respect_alert_date() {
        let alert = AlertCriteria {
            id: "a".to_string(),
            active: true,
            created_at: Some(now() - Duration::days(3)),
            ..AlertCriteria::default()
        };
        let mut before = create_test_listing("before", "Lyon", 800, 20);
        before.created_at = Some(now() - Duration::days(10));
        let after = create_test_listing("after", "Lyon", 800, 20);
        let mut undated = create_test_listing("undated", "Lyon", 800, 20);
        undated.created_at = None;

        let listings = new_listings_for_alert(&alert, vec![before, after, undated]);

        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["after", "undated"]);
    }
}
