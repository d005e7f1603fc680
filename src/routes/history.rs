use crate::models::{SearchEntry, SearchLogRequest, StructureType};
use crate::routes::auth::BearerAuth;
use crate::routes::errors::ApiError;
use crate::routes::matches::AppState;
use crate::services::CacheKey;
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure search history routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/search-logs", web::post().to(record_search));
}

/// Record search endpoint
///
/// POST /api/search-logs
///
/// Request body:
/// ```json
/// {
///   "city": "Lyon",
///   "radius": 20,
///   "structure_type": "MSP",
///   "profession": "Kinésithérapeute"
/// }
/// ```
async fn record_search(
    state: web::Data<AppState>,
    auth: BearerAuth,
    req: web::Json<SearchLogRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search log of {}: {:?}", auth.user_id, errors);
        return Err(ApiError::bad_request(errors.to_string()));
    }

    let entry = to_entry(req.into_inner())?;
    let record = state.postgres.record_search(&auth.user_id, entry).await?;

    if let Err(e) = state
        .cache
        .invalidate_prefix(&CacheKey::matches_prefix(&auth.user_id))
        .await
    {
        tracing::warn!("Failed to invalidate recommendations of {}: {}", auth.user_id, e);
    }

    Ok(HttpResponse::Created().json(record))
}

/// Blank fields become unset; an unknown structure type is rejected
fn to_entry(req: SearchLogRequest) -> Result<SearchEntry, ApiError> {
    let structure_type = match non_blank(req.structure_type) {
        Some(raw) => Some(raw.parse::<StructureType>().map_err(ApiError::bad_request)?),
        None => None,
    };

    Ok(SearchEntry {
        city: non_blank(req.city),
        radius: req.radius.filter(|r| *r > 0),
        structure_type,
        profession: non_blank(req.profession),
        searched_at: chrono::Utc::now(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
