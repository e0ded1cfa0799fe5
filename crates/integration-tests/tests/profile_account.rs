//! Registration and profile management against the mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bee_commerce_client::session::MemoryStorage;
use bee_commerce_client::{
    ApiClient, ClientConfig, ClientError, ProfileUpdate, Storefront,
};
use bee_commerce_integration_tests::{MockBackend, PASSWORD, USERNAME};

fn client_for(backend: &MockBackend) -> ApiClient {
    let config = ClientConfig::with_base_url(&backend.base_url()).unwrap();
    ApiClient::new(&config, Box::new(MemoryStorage::new())).unwrap()
}

#[tokio::test]
async fn test_register_then_login() {
    let backend = MockBackend::start().await;
    let config = ClientConfig::with_base_url(&backend.base_url()).unwrap();
    let mut shop = Storefront::with_storage(config, Box::new(MemoryStorage::new())).unwrap();

    // Registration immediately logs in with the new credentials.
    let session = shop
        .register("worker", "worker@example.com", "buzzbuzzbuzz")
        .await
        .unwrap();
    assert!(session.is_active());
    assert!(shop.is_logged_in());
}

#[tokio::test]
async fn test_register_duplicate_username_flattens_field_errors() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);

    let err = client
        .register(USERNAME, "bee@example.com", "short")
        .await
        .unwrap_err();
    match err {
        ClientError::Validation(message) => {
            assert!(message.contains("username already exists"));
            assert!(message.contains("too short"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_profile_round_trip() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);
    client.login(USERNAME, PASSWORD).await.unwrap();

    let profile = client.profile().await.unwrap();
    assert_eq!(profile.username, USERNAME);
    assert_eq!(profile.first_name, None);

    let update = ProfileUpdate::diff(&profile, USERNAME, &profile.email, "Bea", "Keeper");
    let updated = client.update_profile(&update).await.unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Bea"));
    assert_eq!(updated.last_name.as_deref(), Some("Keeper"));
}

#[tokio::test]
async fn test_profile_update_clears_name_with_null() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);
    client.login(USERNAME, PASSWORD).await.unwrap();

    let profile = client.profile().await.unwrap();
    let update = ProfileUpdate::diff(&profile, USERNAME, &profile.email, "Bea", "");
    let updated = client.update_profile(&update).await.unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Bea"));

    let update = ProfileUpdate::diff(&updated, USERNAME, &updated.email, "", "");
    let cleared = client.update_profile(&update).await.unwrap();
    assert_eq!(cleared.first_name, None);
}

#[tokio::test]
async fn test_profile_update_rejection_surfaces_validation() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);
    client.login(USERNAME, PASSWORD).await.unwrap();

    let update = ProfileUpdate {
        email: Some("taken@example.com".to_string()),
        ..ProfileUpdate::default()
    };
    let err = client.update_profile(&update).await.unwrap_err();
    match err {
        ClientError::Validation(message) => {
            assert!(message.contains("already in use"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}
