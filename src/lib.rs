//! Cablib Match - listing recommendation service for the Cablib marketplace
//!
//! Ranks the office listings of the marketplace for a health practitioner
//! from their alerts, search history and declared preferences, with a score
//! out of 100 and the reasons behind it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchPolicy, Matcher, ScoredListing};
pub use crate::models::{AlertCriteria, Listing, MatchResult, PractitionerProfile, ScoringWeights};
