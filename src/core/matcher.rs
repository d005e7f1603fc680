use crate::core::{
    candidates::collect_candidates,
    features::{FeatureExtractor, PractitionerSignals},
    reasons::render_reasons,
    scoring::{Reason, Scorer},
    selector::{resolve_limit, select_top},
};
use crate::models::{Listing, MatchResult, PractitionerProfile, ScoringWeights};
use chrono::{DateTime, Duration, Utc};

/// Tuning of the matching pipeline apart from the weight table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub default_limit: usize,
    pub max_limit: usize,
    pub novelty_window_days: i64,
    pub search_history_depth: usize,
    pub max_reasons: usize,
    pub reason_min_points: f64,
    pub rent_tolerance: f64,
    pub size_tolerance: f64,
    pub profession_prefilter: bool,
    pub min_score: u8,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            default_limit: 3,
            max_limit: 50,
            novelty_window_days: 14,
            search_history_depth: 20,
            max_reasons: 3,
            reason_min_points: 1.0,
            rent_tolerance: 0.5,
            size_tolerance: 0.5,
            profession_prefilter: false,
            min_score: 0,
        }
    }
}

impl MatchPolicy {
    pub fn resolve_limit(&self, raw: Option<&str>) -> usize {
        resolve_limit(raw, self.default_limit, self.max_limit)
    }
}

/// A listing with its score and the evidence behind it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredListing {
    pub listing: Listing,
    pub score: u8,
    pub reasons: Vec<Reason>,
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<ScoredListing>,
    pub total_candidates: usize,
    pub skipped: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Candidate collection (eligibility, optional profession pre-filter)
/// 2. Feature extraction per candidate
/// 3. Weighted scoring with reasons
/// 4. Top-N selection
#[derive(Debug, Clone)]
pub struct Matcher {
    policy: MatchPolicy,
    extractor: FeatureExtractor,
    scorer: Scorer,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, policy: MatchPolicy) -> Self {
        Self {
            extractor: FeatureExtractor::new(
                Duration::days(policy.novelty_window_days),
                policy.rent_tolerance,
                policy.size_tolerance,
            ),
            scorer: Scorer::new(weights, policy.max_reasons, policy.reason_min_points),
            policy,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), MatchPolicy::default())
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn weights(&self) -> &ScoringWeights {
        self.scorer.weights()
    }

    /// Rank listings for a practitioner.
    ///
    /// # Arguments
    /// * `profile` - Snapshot of the practitioner
    /// * `listings` - The listings catalog
    /// * `limit` - Maximum number of results, `None` for all of them
    /// * `now` - Reference time for listing freshness
    ///
    /// Listings that cannot be scored are skipped and counted in `skipped`.
    pub fn find_matches(
        &self,
        profile: &PractitionerProfile,
        listings: Vec<Listing>,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> MatchOutcome {
        let signals = PractitionerSignals::from_profile(profile, self.policy.search_history_depth);
        let prefilter = self.policy.profession_prefilter.then(|| signals.professions());

        let candidates = collect_candidates(profile, listings, prefilter);
        let total_candidates = candidates.len();
        let mut skipped = 0;

        let scored: Vec<ScoredListing> = candidates
            .into_iter()
            .filter_map(|listing| match self.extractor.extract(&signals, &listing, now) {
                Ok(features) => {
                    let result = self.scorer.score(&features);
                    Some(ScoredListing {
                        listing,
                        score: result.score,
                        reasons: result.reasons,
                    })
                }
                Err(e) => {
                    tracing::warn!("Skipping listing for {}: {}", profile.user_id, e);
                    skipped += 1;
                    None
                }
            })
            .filter(|scored| scored.score >= self.policy.min_score)
            .collect();

        MatchOutcome {
            matches: select_top(scored, limit),
            total_candidates,
            skipped,
        }
    }

    /// Turn ranked listings into the response shape, rendering reasons
    pub fn render(&self, matches: Vec<ScoredListing>, profile: &PractitionerProfile) -> Vec<MatchResult> {
        let signals = PractitionerSignals::from_profile(profile, self.policy.search_history_depth);

        matches
            .into_iter()
            .map(|scored| MatchResult {
                reasons: render_reasons(&scored.reasons, &scored.listing, signals.professions()),
                score: scored.score,
                listing: scored.listing,
            })
            .collect()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
