use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_style() -> String {
    "comic book art".to_string()
}

/// Chat assistant request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 8192))]
    pub message: String,

    #[serde(default)]
    pub generate_image: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub success: bool,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub image_generated: bool,
}

/// Direct panel generation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    #[validate(length(min = 1, max = 4096))]
    pub prompt: String,

    #[serde(default = "default_style")]
    #[validate(length(max = 256))]
    pub style: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationResponse {
    pub success: bool,
    pub image_url: String,
    pub prompt: String,
    pub model: String,
}

/// Finished panel returned by the image provider
#[derive(Debug, Clone)]
pub struct GeneratedPanel {
    pub image_url: String,
    pub model: String,
}

/// Provider configuration flags (GET /api/v1/chat/health)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHealthResponse {
    pub status: &'static str,
    pub chat_configured: bool,
    pub image_configured: bool,
    pub chat_available: bool,
    pub image_generation_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
