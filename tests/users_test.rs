use std::sync::Arc;

use panelx::models::users::{CreateUserRequest, UpdateUserRequest};
use panelx::services::UserService;
use panelx::store::MemoryStore;
use panelx::ApiError;

fn service() -> UserService {
    UserService::new(Arc::new(MemoryStore::new()))
}

fn create_request(uid: &str, email: &str, username: Option<&str>) -> CreateUserRequest {
    CreateUserRequest {
        uid: uid.to_string(),
        email: email.to_string(),
        username: username.map(|s| s.to_string()),
        role: "creator".to_string(),
        avatar_url: None,
        bio: None,
    }
}

#[tokio::test]
async fn test_create_profile_defaults_username_from_email() {
    let service = service();

    let profile = service
        .create_profile(create_request("u1", "alice@example.com", None))
        .await
        .unwrap();

    assert_eq!(profile.username, "alice");
    assert_eq!(profile.role, "creator");
}

#[tokio::test]
async fn test_create_profile_rejects_duplicate_uid() {
    let service = service();

    service
        .create_profile(create_request("u1", "alice@example.com", None))
        .await
        .unwrap();

    let err = service
        .create_profile(create_request("u1", "alice@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_taken_username_gets_uid_suffix() {
    let service = service();

    service
        .create_profile(create_request("u1", "alice@example.com", Some("alice")))
        .await
        .unwrap();

    let profile = service
        .create_profile(create_request("u2xyz", "alice@other.com", Some("alice")))
        .await
        .unwrap();

    assert_eq!(profile.username, "alice_u2xy");
}

#[tokio::test]
async fn test_update_profile_enforces_username_uniqueness() {
    let service = service();

    service
        .create_profile(create_request("u1", "alice@example.com", Some("alice")))
        .await
        .unwrap();
    service
        .create_profile(create_request("u2", "bob@example.com", Some("bob")))
        .await
        .unwrap();

    let err = service
        .update_profile(
            "u2",
            UpdateUserRequest {
                username: Some("alice".to_string()),
                bio: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // Re-asserting your own username is fine, and bio updates apply
    let profile = service
        .update_profile(
            "u2",
            UpdateUserRequest {
                username: Some("bob".to_string()),
                bio: Some("Draws robots".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.username, "bob");
    assert_eq!(profile.bio.as_deref(), Some("Draws robots"));
}

#[tokio::test]
async fn test_delete_profile() {
    let service = service();

    service
        .create_profile(create_request("u1", "alice@example.com", None))
        .await
        .unwrap();
    service.delete_profile("u1").await.unwrap();

    let err = service.get_profile("u1").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = service.delete_profile("u1").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_username_availability() {
    let service = service();

    assert!(service.username_available("alice").await.unwrap());

    service
        .create_profile(create_request("u1", "alice@example.com", Some("alice")))
        .await
        .unwrap();

    assert!(!service.username_available("alice").await.unwrap());
    assert!(service.username_available("bob").await.unwrap());
}
