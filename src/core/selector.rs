use crate::core::error::MatchError;
use crate::core::matcher::ScoredListing;
use std::cmp::Ordering;
use std::num::IntErrorKind;

/// Parse a raw `limit` query value. Missing is `Ok(None)`.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, MatchError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    // Integers too large for i64 saturate and get capped later
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(Some(usize::try_from(value).unwrap_or(usize::MAX))),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(Some(usize::MAX)),
        Ok(_) => Err(MatchError::InvalidLimit(format!("limit must be positive, got {}", raw))),
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => {
            Err(MatchError::InvalidLimit(format!("limit must be positive, got {}", raw)))
        }
        Err(_) => Err(MatchError::InvalidLimit(format!("limit is not a number: {}", raw))),
    }
}

/// Resolve the limit of a request: invalid values fall back to the default,
/// large ones are capped at `max_limit`
pub fn resolve_limit(raw: Option<&str>, default_limit: usize, max_limit: usize) -> usize {
    let limit = match parse_limit(raw) {
        Ok(Some(limit)) => limit,
        Ok(None) => default_limit,
        Err(e) => {
            tracing::warn!("{}, using default limit {}", e, default_limit);
            default_limit
        }
    };

    limit.min(max_limit.max(1))
}

/// Ranking order: score desc, newest listing first, then listing id asc
pub fn compare_ranked(a: &ScoredListing, b: &ScoredListing) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.listing.created_at.cmp(&a.listing.created_at))
        .then_with(|| a.listing.id.cmp(&b.listing.id))
}

/// Sort by ranking order and keep at most `limit` results (all when `None`)
pub fn select_top(mut results: Vec<ScoredListing>, limit: Option<usize>) -> Vec<ScoredListing> {
    results.sort_by(compare_ranked);
    if let Some(limit) = limit {
        results.truncate(limit);
    }
    results
}
