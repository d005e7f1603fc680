// Core algorithm exports
pub mod candidates;
pub mod error;
pub mod features;
pub mod matcher;
pub mod reasons;
pub mod scoring;
pub mod selector;

pub use candidates::{collect_candidates, is_eligible, new_listings_for_alert, satisfies_alert};
pub use error::MatchError;
pub use features::{FeatureExtractor, FeatureVector, PractitionerSignals};
pub use matcher::{MatchOutcome, MatchPolicy, Matcher, ScoredListing};
pub use scoring::{MatchScore, Reason, Scorer};
pub use selector::{parse_limit, resolve_limit, select_top};
