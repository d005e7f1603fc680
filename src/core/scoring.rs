use crate::core::features::FeatureVector;
use crate::models::{FeatureKind, ScoringWeights};

/// Evidence for a score: which feature contributed and how many points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reason {
    pub kind: FeatureKind,
    pub fit: f64,
    /// Points out of 100 this feature added to the score
    pub contribution: f64,
}

/// Score of one listing for one practitioner
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub score: u8,
    pub reasons: Vec<Reason>,
}

/// Combines a feature vector into a 0-100 score with ranked reasons
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    weights: ScoringWeights,
    max_reasons: usize,
    reason_min_points: f64,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, max_reasons: usize, reason_min_points: f64) -> Self {
        Self {
            weights,
            max_reasons,
            reason_min_points,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score formula, over the features present in the vector:
    /// score = round(100 * Σ(weight_i * fit_i) / Σ(weight_i))
    pub fn score(&self, features: &FeatureVector) -> MatchScore {
        let contributions = weighted_contributions(features, &self.weights);
        let total: f64 = contributions.iter().map(|reason| reason.contribution).sum();

        let mut reasons: Vec<Reason> = contributions
            .into_iter()
            .filter(|reason| reason.contribution > 0.0 && reason.contribution >= self.reason_min_points)
            .collect();
        // Stable sort keeps feature declaration order for equal contributions
        reasons.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
        reasons.truncate(self.max_reasons);

        MatchScore {
            score: total.round().clamp(0.0, 100.0) as u8,
            reasons,
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default(), 3, 1.0)
    }
}

/// Per-feature points, normalised by the weights of the features present
fn weighted_contributions(features: &FeatureVector, weights: &ScoringWeights) -> Vec<Reason> {
    let total_weight: f64 = features.iter().map(|f| weights.weight(f.kind)).sum();
    if total_weight <= 0.0 {
        return Vec::new();
    }

    features
        .iter()
        .map(|f| Reason {
            kind: f.kind,
            fit: f.fit,
            contribution: 100.0 * weights.weight(f.kind) * f.fit / total_weight,
        })
        .collect()
}
