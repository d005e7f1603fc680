use crate::models::{AlertCriteria, Application, Favorite, Listing, UserAccount};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the marketplace backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: token rejected by the backend")]
    Unauthorized,

    #[error("Forbidden: {0} not allowed for this account")]
    Forbidden(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Marketplace backend client
///
/// Reads everything the matcher needs about a practitioner with the
/// practitioner's own bearer token:
/// - account and declared preferences
/// - alerts, favorites and applications
/// - the public listings catalog
pub struct BackendClient {
    base_url: String,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the account behind a token
    pub async fn get_account(&self, token: &str) -> Result<UserAccount, BackendError> {
        let json = self.get_json("/api/auth/me", Some(token)).await?;

        serde_json::from_value(json)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse account: {}", e)))
    }

    /// Fetch the practitioner's saved alerts, skipping undecodable ones
    pub async fn get_alerts(&self, token: &str) -> Result<Vec<AlertCriteria>, BackendError> {
        let json = self.get_json("/api/alerts", Some(token)).await?;
        decode_each(json, "alert")
    }

    /// Listing ids the practitioner favorited
    pub async fn get_favorite_ids(&self, token: &str) -> Result<HashSet<String>, BackendError> {
        let json = self.get_json("/api/favorites", Some(token)).await?;
        let favorites: Vec<Favorite> = decode_each(json, "favorite")?;

        Ok(favorites.into_iter().map(|f| f.listing_id).collect())
    }

    /// Listing ids the practitioner applied to, whatever the application status
    pub async fn get_applied_ids(&self, token: &str) -> Result<HashSet<String>, BackendError> {
        let json = self.get_json("/api/applications/mine", Some(token)).await?;
        let applications: Vec<Application> = decode_each(json, "application")?;

        Ok(applications.into_iter().map(|a| a.listing_id).collect())
    }

    /// Fetch the public listings catalog
    ///
    /// Listings that cannot be decoded are dropped with a warning.
    pub async fn list_listings(&self) -> Result<Vec<Listing>, BackendError> {
        let json = self.get_json("/api/listings", None).await?;
        let listings: Vec<Listing> = decode_each(json, "listing")?;

        tracing::debug!("Fetched {} listings from {}", listings.len(), self.base_url);

        Ok(listings)
    }

    async fn get_json(&self, path: &str, token: Option<&str>) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("Fetching {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => Err(BackendError::Unauthorized),
            StatusCode::FORBIDDEN => Err(BackendError::Forbidden(path.to_string())),
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(path.to_string())),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Backend call {} failed: {} - {}", path, status, body);
                Err(BackendError::ApiError(format!("{} returned {}", path, status)))
            }
            _ => Ok(response.json().await?),
        }
    }
}

/// Decode a JSON array element by element so one bad document does not
/// poison the whole collection
fn decode_each<T: DeserializeOwned>(json: Value, what: &str) -> Result<Vec<T>, BackendError> {
    let Value::Array(items) = json else {
        return Err(BackendError::InvalidResponse(format!("Expected an array of {}s", what)));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect())
}
