use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    error::{ApiError, Result},
    models::users::{CreateUserRequest, UpdateUserRequest, UserProfile},
    store::ProfileStore,
};

/// Profile store collaborator: user records keyed by uid, with a
/// platform-wide unique username.
pub struct UserService {
    store: Arc<dyn ProfileStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Creates a profile after signup. A missing username is derived from the
    /// email local part; a taken username gets a uid-derived suffix.
    #[instrument(skip(self, request))]
    pub async fn create_profile(&self, request: CreateUserRequest) -> Result<UserProfile> {
        if self.store.get_user(&request.uid).await?.is_some() {
            return Err(ApiError::Conflict("User already exists".to_string()));
        }

        let mut username = match request.username {
            Some(name) => name,
            None => username_from_email(&request.email),
        };

        if self.store.find_by_username(&username).await?.is_some() {
            let suffix: String = request.uid.chars().take(4).collect();
            username = format!("{}_{}", username, suffix);
        }

        let now = OffsetDateTime::now_utc();
        let profile = UserProfile {
            uid: request.uid,
            email: request.email,
            username,
            role: request.role,
            avatar_url: request.avatar_url,
            bio: request.bio,
            created_at: now,
            updated_at: now,
        };

        self.store.put_user(&profile).await?;

        info!(
            "Created user profile: uid={}, username={}",
            profile.uid, profile.username
        );

        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, uid: &str) -> Result<UserProfile> {
        self.store
            .get_user(uid)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Applies a partial update. Username changes are checked for uniqueness
    /// against every other profile.
    #[instrument(skip(self, updates))]
    pub async fn update_profile(&self, uid: &str, updates: UpdateUserRequest) -> Result<UserProfile> {
        let mut profile = self.get_profile(uid).await?;

        if let Some(username) = updates.username {
            if let Some(existing) = self.store.find_by_username(&username).await? {
                if existing.uid != uid {
                    return Err(ApiError::BadRequest("Username already taken".to_string()));
                }
            }
            profile.username = username;
        }

        if let Some(bio) = updates.bio {
            profile.bio = Some(bio);
        }

        profile.updated_at = OffsetDateTime::now_utc();
        self.store.put_user(&profile).await?;

        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn delete_profile(&self, uid: &str) -> Result<()> {
        if self.store.get_user(uid).await?.is_none() {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        self.store.delete_user(uid).await?;

        info!("Deleted user profile: uid={}", uid);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn username_available(&self, username: &str) -> Result<bool> {
        Ok(self.store.find_by_username(username).await?.is_none())
    }
}

fn username_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or(email)
        .to_string()
}
