use serde::{Deserialize, Serialize};
use crate::models::domain::{AlertCriteria, Listing};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Listings created after an alert that satisfy all of its criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMatchesResponse {
    pub alert: AlertCriteria,
    pub new_listings_count: usize,
    pub listings: Vec<Listing>,
}
