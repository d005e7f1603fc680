// Backend client tests against a mock marketplace API

use cablib_match::models::{StructureType, UserType};
use cablib_match::services::{BackendClient, BackendError};
use std::time::Duration;

fn client_for(server: &mockito::Server) -> BackendClient {
    BackendClient::new(server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_forwards_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/alerts")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": "a1", "name": "Lyon", "city": "Lyon", "max_rent": 900, "active": true},
                {"id": "a2", "name": "Vide", "city": "", "structure_type": "cabinet", "active": false}
            ]"#,
        )
        .create_async()
        .await;

    let alerts = client_for(&server).get_alerts("tok").await.unwrap();

    mock.assert_async().await;
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].max_rent, Some(900));
    assert_eq!(alerts[1].city, None);
    assert_eq!(alerts[1].structure_type, Some(StructureType::Cabinet));
}

#[tokio::test]
async fn test_account_with_preferences() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/auth/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "u1",
                "email": "kine@example.fr",
                "profession": "Kinésithérapeute",
                "user_type": "locataire",
                "preferred_city": "Nantes",
                "max_budget": 850,
                "preferred_structure_type": "MSP"
            }"#,
        )
        .create_async()
        .await;

    let account = client_for(&server).get_account("tok").await.unwrap();

    assert_eq!(account.user_type, UserType::Locataire);
    assert_eq!(account.preferences.max_budget, Some(850));
    assert_eq!(account.preferences.preferred_structure_type, Some(StructureType::Msp));
}

#[tokio::test]
async fn test_unauthorized_is_mapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/auth/me")
        .with_status(401)
        .with_body(r#"{"error": "invalid token"}"#)
        .create_async()
        .await;

    let result = client_for(&server).get_account("expired").await;

    assert!(matches!(result, Err(BackendError::Unauthorized)));
}

#[tokio::test]
async fn test_forbidden_is_not_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/alerts")
        .with_status(403)
        .with_body(r#"{"detail": "Réservé aux locataires"}"#)
        .create_async()
        .await;

    let result = client_for(&server).get_alerts("owner-token").await;

    assert!(matches!(result, Err(BackendError::Forbidden(path)) if path == "/api/alerts"));
}

#[tokio::test]
async fn test_not_found_is_mapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/favorites")
        .with_status(404)
        .create_async()
        .await;

    let result = client_for(&server).get_favorite_ids("tok").await;

    assert!(matches!(result, Err(BackendError::NotFound(path)) if path == "/api/favorites"));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/applications/mine")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let result = client_for(&server).get_applied_ids("tok").await;

    assert!(matches!(result, Err(BackendError::ApiError(_))));
}

#[tokio::test]
async fn test_catalog_skips_undecodable_listings() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/listings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": "l1", "city": "Lyon", "monthly_rent": 800, "size": 20, "structure_type": "MSP"},
                {"city": "no id"},
                {"id": "l3", "city": "Nice", "structure_type": "Clinique"},
                {"id": "l4", "city": "Lille", "is_archived": true}
            ]"#,
        )
        .create_async()
        .await;

    let listings = client_for(&server).list_listings().await.unwrap();

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["l1", "l4"]);
    assert!(listings[1].archived);
}

#[tokio::test]
async fn test_favorite_and_application_ids() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/favorites")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"listing_id": "l1"}, {"listing_id": "l2"}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/applications/mine")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"listing_id": "l2", "status": "rejected"}, {"listing_id": "l3"}]"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let favorites = client.get_favorite_ids("tok").await.unwrap();
    let applied = client.get_applied_ids("tok").await.unwrap();

    assert!(favorites.contains("l1") && favorites.contains("l2"));
    assert_eq!(applied.len(), 2);
    assert!(applied.contains("l3"));
}
