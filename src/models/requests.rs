use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the recommendation endpoints.
///
/// `limit` stays raw text so bad values can fall back to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopMatchesQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

/// Request to log a practitioner search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchLogRequest {
    #[validate(length(max = 120))]
    #[serde(default)]
    pub city: Option<String>,
    #[validate(range(max = 500))]
    #[serde(default)]
    pub radius: Option<u32>,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub structure_type: Option<String>,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub profession: Option<String>,
}
