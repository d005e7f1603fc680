// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AlertCriteria, Application, DeclaredPreferences, Favorite, FeatureKind, Listing, MatchResult,
    PractitionerProfile, ScoringWeights, SearchEntry, StructureType, UserAccount, UserType,
    VerificationStatus,
};
pub use requests::{SearchLogRequest, TopMatchesQuery};
pub use responses::{AlertMatchesResponse, ErrorResponse, HealthResponse};
