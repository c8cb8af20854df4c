use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::{
        common::MessageResponse,
        users::{CreateUserRequest, UpdateUserRequest, UserResponse, UsernameAvailability},
    },
};

/// POST /api/v1/users/create
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let profile = state.user_service.create_profile(request).await?;

    Ok(Json(UserResponse {
        success: true,
        message: "User profile created successfully".to_string(),
        user: Some(profile.into()),
    }))
}

/// GET /api/v1/users/{uid}
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<UserResponse>> {
    let profile = state.user_service.get_profile(&uid).await?;

    Ok(Json(UserResponse {
        success: true,
        message: "User found".to_string(),
        user: Some(profile.into()),
    }))
}

/// PUT /api/v1/users/{uid}
#[instrument(skip(state, updates))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(updates): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    updates
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let profile = state.user_service.update_profile(&uid, updates).await?;

    Ok(Json(UserResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
        user: Some(profile.into()),
    }))
}

/// DELETE /api/v1/users/{uid}
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.user_service.delete_profile(&uid).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// GET /api/v1/users/username/{username}
#[instrument(skip(state))]
pub async fn check_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UsernameAvailability>> {
    let available = state.user_service.username_available(&username).await?;

    Ok(Json(UsernameAvailability {
        available,
        message: if available {
            "Username is available".to_string()
        } else {
            "Username is taken".to_string()
        },
    }))
}
