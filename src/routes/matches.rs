use crate::core::{new_listings_for_alert, Matcher};
use crate::models::{
    AlertMatchesResponse, HealthResponse, MatchResult, PractitionerProfile, TopMatchesQuery, UserType,
};
use crate::routes::auth::{BearerAuth, TokenVerifier};
use crate::routes::errors::ApiError;
use crate::services::{BackendClient, BackendError, CacheKey, CacheManager, CatalogSnapshot, PostgresClient};
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use std::fmt::Display;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub verifier: Arc<TokenVerifier>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/matches/top", web::get().to(top_matches))
        .route("/matches", web::get().to(all_matches))
        .route("/alerts/{alert_id}/matches", web::get().to(alert_matches));
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Top recommendations endpoint
///
/// GET /api/matches/top?limit=3
///
/// Invalid limits fall back to the default instead of failing the request.
async fn top_matches(
    state: web::Data<AppState>,
    auth: BearerAuth,
    query: web::Query<TopMatchesQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = state.matcher.policy().resolve_limit(query.limit.as_deref());

    let results = recommend(&state, &auth, &limit.to_string(), Some(limit)).await?;

    Ok(HttpResponse::Ok().json(results))
}

/// Full ranked list endpoint
///
/// GET /api/matches
async fn all_matches(state: web::Data<AppState>, auth: BearerAuth) -> Result<HttpResponse, ApiError> {
    let results = recommend(&state, &auth, "all", None).await?;

    Ok(HttpResponse::Ok().json(results))
}

/// Listings published since an alert was created that satisfy it
///
/// GET /api/alerts/{alert_id}/matches
async fn alert_matches(
    state: web::Data<AppState>,
    auth: BearerAuth,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let alert_id = path.into_inner();

    let alerts = state.backend.get_alerts(&auth.token).await.map_err(|e| match e {
        BackendError::Unauthorized | BackendError::Forbidden(_) => ApiError::from(e),
        other => {
            tracing::error!("Failed to fetch alerts for {}: {}", auth.user_id, other);
            ApiError::bad_gateway(format!("Failed to fetch alerts: {}", other))
        }
    })?;

    let alert = alerts
        .into_iter()
        .find(|alert| alert.id == alert_id)
        .ok_or_else(|| ApiError::not_found(format!("Alert {} not found", alert_id)))?;

    let catalog = load_catalog(&state).await;
    let listings = new_listings_for_alert(&alert, catalog.listings);

    tracing::info!(
        "Alert {} of {} has {} new listings",
        alert.id,
        auth.user_id,
        listings.len()
    );

    Ok(HttpResponse::Ok().json(AlertMatchesResponse {
        new_listings_count: listings.len(),
        alert,
        listings,
    }))
}

/// Ranked recommendations for the caller, served from cache when the
/// catalog they were computed from is still current.
///
/// The caller's account and role are checked before any cached result is
/// served.
async fn recommend(
    state: &AppState,
    auth: &BearerAuth,
    scope: &str,
    limit: Option<usize>,
) -> Result<Vec<MatchResult>, ApiError> {
    let (profile, catalog) = tokio::join!(load_practitioner(state, auth), load_catalog(state));
    let profile = profile?;

    let cache_key = CacheKey::matches(&auth.user_id, scope, catalog.version);
    let cacheable = catalog.version > 0;

    if cacheable {
        match state.cache.get::<Vec<MatchResult>>(&cache_key).await {
            Ok(Some(results)) => {
                tracing::debug!("Serving cached recommendations for {}", auth.user_id);
                return Ok(results);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", cache_key, e),
        }
    }

    let outcome = state
        .matcher
        .find_matches(&profile, catalog.listings, limit, Utc::now());

    tracing::info!(
        "Returning {} matches for {} (from {} candidates, {} skipped)",
        outcome.matches.len(),
        profile.user_id,
        outcome.total_candidates,
        outcome.skipped
    );

    let results = state.matcher.render(outcome.matches, &profile);

    if cacheable {
        if let Err(e) = state.cache.set(&cache_key, &results).await {
            tracing::warn!("Failed to cache recommendations for {}: {}", auth.user_id, e);
        }
    }

    Ok(results)
}

/// Listings catalog, from cache or from the backend.
///
/// A backend failure yields an empty catalog that is not cached.
async fn load_catalog(state: &AppState) -> CatalogSnapshot {
    let key = CacheKey::catalog();

    match state.cache.get::<CatalogSnapshot>(&key).await {
        Ok(Some(snapshot)) => return snapshot,
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
    }

    match state.backend.list_listings().await {
        Ok(listings) => {
            let snapshot = CatalogSnapshot {
                version: Utc::now().timestamp_millis(),
                listings,
            };
            if let Err(e) = state.cache.set(&key, &snapshot).await {
                tracing::warn!("Failed to cache listings catalog: {}", e);
            }
            snapshot
        }
        Err(e) => {
            tracing::error!("Failed to fetch listings catalog: {}", e);
            CatalogSnapshot::default()
        }
    }
}

/// Snapshot of the caller, every collaborator read issued concurrently.
///
/// Only the account is required; the other reads degrade to empty.
async fn load_practitioner(state: &AppState, auth: &BearerAuth) -> Result<PractitionerProfile, ApiError> {
    let depth = state.matcher.policy().search_history_depth;

    let (account, alerts, favorites, applied, searches) = tokio::join!(
        state.backend.get_account(&auth.token),
        state.backend.get_alerts(&auth.token),
        state.backend.get_favorite_ids(&auth.token),
        state.backend.get_applied_ids(&auth.token),
        state.postgres.recent_searches(&auth.user_id, depth),
    );

    let account = account.map_err(|e| {
        tracing::error!("Failed to fetch account of {}: {}", auth.user_id, e);
        ApiError::from(e)
    })?;

    if account.user_type != UserType::Locataire {
        return Err(ApiError::forbidden("Recommendations are reserved to practitioners"));
    }

    if account.id != auth.user_id {
        tracing::warn!("Token subject {} resolved to account {}", auth.user_id, account.id);
    }

    let mut profile = PractitionerProfile::from_account(account);
    profile.alerts = or_degraded(alerts, "alerts", &auth.user_id);
    profile.favorites = or_degraded(favorites, "favorites", &auth.user_id);
    profile.applied = or_degraded(applied, "applications", &auth.user_id);
    profile.searches = or_degraded(searches, "search history", &auth.user_id);

    Ok(profile)
}

fn or_degraded<T: Default, E: Display>(result: Result<T, E>, what: &str, user_id: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch {} for {}, proceeding without: {}", what, user_id, e);
        T::default()
    })
}
