use axum::{extract::State, Json};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::chat::{
        ChatHealthResponse, ChatMessageResponse, ChatRequest, ImageGenerationRequest,
        ImageGenerationResponse,
    },
};

const IMAGE_PREFIXES: [&str; 3] = ["generate:", "draw:", "create:"];

/// POST /api/v1/chat/message
///
/// Assistant endpoint. Messages carrying a `generate:`/`draw:`/`create:`
/// prefix (or the explicit flag) trigger panel generation; provider failures
/// degrade into an assistant reply instead of an error response.
#[instrument(skip(state, request))]
pub async fn chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatMessageResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let message_lower = request.message.to_lowercase();
    let is_image_request =
        request.generate_image || IMAGE_PREFIXES.iter().any(|p| message_lower.contains(p));

    if is_image_request {
        if !state.image_service.is_configured() {
            let response = state
                .chat_service
                .chat(
                    "The user wants to generate an image but image generation is not available. \
                     Politely let them know it is temporarily unavailable but you can still help \
                     them brainstorm and plan their comic.",
                )
                .await;

            return Ok(Json(ChatMessageResponse {
                success: true,
                response,
                image_url: None,
                image_generated: false,
            }));
        }

        let prompt = extract_prompt(&request.message, &message_lower);

        match state
            .image_service
            .generate_panel(&prompt, "comic book art")
            .await
        {
            Ok(panel) => {
                let comment = state
                    .chat_service
                    .chat(&format!(
                        "The user just generated a comic panel image with this prompt: '{}'. \
                         Give them a brief, enthusiastic response (1-2 sentences) about their \
                         image and maybe a quick tip.",
                        prompt
                    ))
                    .await;

                return Ok(Json(ChatMessageResponse {
                    success: true,
                    response: comment,
                    image_url: Some(panel.image_url),
                    image_generated: true,
                }));
            }
            Err(e) => {
                tracing::warn!("Panel generation failed in chat: {}", e);
                let response = state
                    .chat_service
                    .chat(
                        "Image generation just failed for the user. Politely let them know and \
                         offer to help them brainstorm instead.",
                    )
                    .await;

                return Ok(Json(ChatMessageResponse {
                    success: false,
                    response,
                    image_url: None,
                    image_generated: false,
                }));
            }
        }
    }

    // Regular chat
    let response = state.chat_service.chat(&request.message).await;

    Ok(Json(ChatMessageResponse {
        success: true,
        response,
        image_url: None,
        image_generated: false,
    }))
}

/// POST /api/v1/chat/generate-image
#[instrument(skip(state, request))]
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<ImageGenerationRequest>,
) -> Result<Json<ImageGenerationResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let panel = state
        .image_service
        .generate_panel(&request.prompt, &request.style)
        .await?;

    Ok(Json(ImageGenerationResponse {
        success: true,
        image_url: panel.image_url,
        prompt: request.prompt,
        model: panel.model,
    }))
}

/// GET /api/v1/chat/health
#[instrument(skip(state))]
pub async fn chat_health(State(state): State<AppState>) -> Json<ChatHealthResponse> {
    let chat_configured = state.chat_service.is_configured();
    let image_configured = state.image_service.is_configured();

    Json(ChatHealthResponse {
        status: "online",
        chat_configured,
        image_configured,
        chat_available: chat_configured,
        image_generation_available: image_configured,
        model: chat_configured.then(|| state.chat_service.model().to_string()),
    })
}

/// Strips the first image prefix from the message; everything after it is the
/// generation prompt.
fn extract_prompt(message: &str, message_lower: &str) -> String {
    for prefix in IMAGE_PREFIXES {
        if let Some(idx) = message_lower.find(prefix) {
            return message[idx + prefix.len()..].trim().to_string();
        }
    }
    message.to_string()
}
