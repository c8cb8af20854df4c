use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    config::ImageProviderConfig,
    error::{ApiError, Result},
    models::chat::GeneratedPanel,
};

/// Image-generation provider client (predictions API).
///
/// Contract: submit a job, then poll its status endpoint at a fixed interval
/// up to a bounded number of attempts. A "failed" status and poll exhaustion
/// are distinct terminal failures.
pub struct ImageService {
    config: ImageProviderConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct PredictionRequest {
    version: String,
    input: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ImageService {
    pub fn new(config: &ImageProviderConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            config: config.clone(),
            http_client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Generates one comic panel for the prompt and returns its URL.
    #[instrument(skip(self, prompt, style))]
    pub async fn generate_panel(&self, prompt: &str, style: &str) -> Result<GeneratedPanel> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ApiError::ProviderUnavailable(
                "Image generation unavailable. Provider API key not configured.".to_string(),
            )
        })?;

        let enhanced_prompt = format!(
            "{}, {}, highly detailed, professional comic book illustration, vibrant colors",
            prompt, style
        );

        let request = PredictionRequest {
            version: self.config.model_version.clone(),
            input: json!({
                "prompt": enhanced_prompt,
                "width": 896,
                "height": 1152,
                "num_outputs": 1,
                "guidance_scale": 7.5,
                "num_inference_steps": 30,
                "negative_prompt": "blurry, bad anatomy, ugly, distorted, low quality",
            }),
        };

        info!(
            "Submitting image generation job: model={}, prompt_len={}",
            self.config.model_version,
            enhanced_prompt.len()
        );

        let response = self
            .http_client
            .post(format!("{}/predictions", self.config.api_base))
            .header("Authorization", format!("Token {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::AIProvider(format!("Prediction request failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::CREATED {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::AIProvider(format!(
                "Prediction create error {}: {}",
                status.as_u16(),
                text
            )));
        }

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|e| ApiError::AIProvider(format!("Failed to parse prediction: {}", e)))?;

        self.poll_until_done(api_key, &prediction.id).await
    }

    /// Polls the job at fixed intervals until it reaches a terminal state or
    /// the configured attempts run out.
    async fn poll_until_done(&self, api_key: &str, prediction_id: &str) -> Result<GeneratedPanel> {
        for _ in 0..self.config.poll_attempts {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.poll_interval_ms))
                .await;

            let response = self
                .http_client
                .get(format!(
                    "{}/predictions/{}",
                    self.config.api_base, prediction_id
                ))
                .header("Authorization", format!("Token {}", api_key))
                .send()
                .await
                .map_err(|e| ApiError::AIProvider(format!("Status poll failed: {}", e)))?;

            let prediction: Prediction = response.json().await.map_err(|e| {
                ApiError::AIProvider(format!("Failed to parse prediction status: {}", e))
            })?;

            match prediction.status.as_str() {
                "succeeded" => {
                    let image_url = prediction
                        .output
                        .as_ref()
                        .and_then(output_url)
                        .ok_or_else(|| {
                            ApiError::GenerationFailed("No image in prediction output".to_string())
                        })?;

                    info!("Image generation succeeded: job={}", prediction_id);

                    return Ok(GeneratedPanel {
                        image_url,
                        model: "SDXL".to_string(),
                    });
                }
                "failed" => {
                    warn!(
                        "Image generation failed: job={}, error={:?}",
                        prediction_id, prediction.error
                    );
                    return Err(ApiError::GenerationFailed(
                        prediction
                            .error
                            .unwrap_or_else(|| "unknown provider error".to_string()),
                    ));
                }
                _ => continue,
            }
        }

        warn!(
            "Image generation timed out: job={}, attempts={}",
            prediction_id, self.config.poll_attempts
        );
        Err(ApiError::GenerationTimeout)
    }
}

/// The provider returns either a bare URL string or a list of URLs.
fn output_url(output: &serde_json::Value) -> Option<String> {
    match output {
        serde_json::Value::String(url) => Some(url.clone()),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}
