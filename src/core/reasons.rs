use crate::core::features::profession_matches;
use crate::core::scoring::Reason;
use crate::models::{FeatureKind, Listing};

/// Render one reason as the French sentence shown on listing cards.
///
/// `professions` are the professions the practitioner holds or searched for;
/// the profession reason names the profile of the listing that matched one.
pub fn render_reason(reason: &Reason, listing: &Listing, professions: &[String]) -> String {
    let full_fit = reason.fit >= 1.0;

    match reason.kind {
        FeatureKind::Profession => {
            let shown = listing
                .profiles_searched
                .iter()
                .find(|searched| professions.iter().any(|p| profession_matches(p, searched)))
                .or_else(|| listing.profiles_searched.first())
                .map(|searched| searched.trim())
                .unwrap_or_default();
            format!("Profil recherché : {}", shown)
        }
        FeatureKind::City => format!("Localisation : {}", listing.city),
        FeatureKind::Rent => {
            let rent = listing.monthly_rent.unwrap_or_default();
            if full_fit {
                format!("Budget adapté : {}€/mois", rent)
            } else {
                format!("Budget acceptable : {}€/mois", rent)
            }
        }
        FeatureKind::Size => {
            let size = listing.size.unwrap_or_default();
            if full_fit {
                format!("Surface suffisante : {}m²", size)
            } else {
                format!("Surface proche : {}m²", size)
            }
        }
        FeatureKind::Structure => match listing.structure_type {
            Some(structure) => format!("Type de structure : {}", structure),
            None => "Type de structure".to_string(),
        },
        FeatureKind::Novelty => "Nouvelle annonce".to_string(),
        FeatureKind::Featured => "Annonce mise en avant".to_string(),
    }
}

pub fn render_reasons(reasons: &[Reason], listing: &Listing, professions: &[String]) -> Vec<String> {
    reasons
        .iter()
        .map(|reason| render_reason(reason, listing, professions))
        .collect()
}
