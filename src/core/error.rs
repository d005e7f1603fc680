use thiserror::Error;

/// Errors raised by the matching pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Practitioner profile unavailable: {0}")]
    ProfileUnavailable(String),

    #[error("Listing {listing_id} is missing {field}")]
    MalformedListing {
        listing_id: String,
        field: &'static str,
    },
}
