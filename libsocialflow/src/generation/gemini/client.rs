//! HTTP client for the Gemini REST API.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use super::dto::{
    CaptionEnvelope, GenerateContentRequest, GenerateContentResponse, Operation,
    PredictLongRunningRequest, VideoInstance, VideoParameters,
};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::generation::{
    ContentGenerator, GenerationResult, ProgressFn, CAPTION_VARIANTS, VIDEO_POLLING,
    VIDEO_RENDERING, VIDEO_STARTING,
};
use crate::types::CaptionVariant;

/// Marker the API returns when the key's project cannot see the model
const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Client for the Gemini generative API.
///
/// The API key is only exposed when building request headers.
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    text_model: String,
    image_model: String,
    video_model: String,
    poll_interval: Duration,
}

impl GeminiClient {
    /// Creates a client from the `[generation]` configuration section.
    ///
    /// # Errors
    ///
    /// `MissingApiKey` when neither the config nor the environment holds a
    /// key; a config error when the poll interval cannot be parsed.
    pub fn from_config(config: &GenerationConfig) -> crate::Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or(GenerationError::MissingApiKey)?;
        let poll_interval = config.video_poll_interval()?;

        debug!(
            base_url = %config.base_url,
            text_model = %config.text_model,
            image_model = %config.image_model,
            video_model = %config.video_model,
            "Created Gemini client"
        );

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            video_model: config.video_model.clone(),
            poll_interval,
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B, not_found_is_credential: bool) -> GenerationResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                GenerationError::Network(format!("Request failed: {}", e))
            })?;

        let response = check_status(response, not_found_is_credential).await?;
        parse_json(response).await
    }

    async fn get(&self, url: &str, not_found_is_credential: bool) -> GenerationResult<Response> {
        let response = self
            .client
            .get(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                GenerationError::Network(format!("Request failed: {}", e))
            })?;

        check_status(response, not_found_is_credential).await
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GenerationResult<GenerateContentResponse> {
        let url = self.model_url(model, "generateContent");
        self.post_json(&url, request, false).await
    }

    async fn download_video(&self, uri: &str) -> GenerationResult<String> {
        let response = self.get(uri, true).await?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or(DEFAULT_VIDEO_MIME)
            .to_string();
        let bytes = response.bytes().await.map_err(|e| {
            error!(error = ?e, "Failed to download video");
            GenerationError::Network(format!("Download failed: {}", e))
        })?;

        if bytes.is_empty() {
            return Err(GenerationError::Failed("Downloaded video is empty".to_string()));
        }

        debug!(bytes = bytes.len(), mime = %mime, "Downloaded video");
        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)))
    }
}

/// Maps a non-success HTTP status to a [`GenerationError`]
async fn check_status(response: Response, not_found_is_credential: bool) -> GenerationResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = api_error_message(&body);
    error!(status = %status, error = %message, "API error");
    Err(classify_api_error(status, message, not_found_is_credential))
}

async fn parse_json<R: DeserializeOwned>(response: Response) -> GenerationResult<R> {
    response.json().await.map_err(|e| {
        error!(error = ?e, "Failed to parse response");
        GenerationError::Failed(format!("Failed to parse JSON: {}", e))
    })
}

/// Pulls `error.message` out of a Gemini error body, or returns the body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn classify_api_error(status: StatusCode, message: String, not_found_is_credential: bool) -> GenerationError {
    let stale_key = message.contains(ENTITY_NOT_FOUND)
        || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (not_found_is_credential && status == StatusCode::NOT_FOUND);

    if stale_key {
        GenerationError::CredentialInvalid(message)
    } else {
        GenerationError::Failed(format!("HTTP {}: {}", status.as_u16(), message))
    }
}

fn caption_prompt(topic: &str, platform_label: &str) -> String {
    format!(
        "Generate {} variations of a social media post for {} based on this topic: {}. \
         Return the response as JSON with an array of objects called 'variations', \
         each containing 'text' and 'hashtags'.",
        CAPTION_VARIANTS, platform_label, topic
    )
}

fn caption_schema() -> serde_json::Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "OBJECT",
            "properties": {
                "variations": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "text": {"type": "STRING"},
                            "hashtags": {"type": "ARRAY", "items": {"type": "STRING"}}
                        },
                        "required": ["text", "hashtags"]
                    }
                }
            }
        }
    })
}

/// Parses the JSON caption payload; an empty list is a failure
fn parse_captions(text: &str) -> GenerationResult<Vec<CaptionVariant>> {
    let envelope: CaptionEnvelope = serde_json::from_str(text.trim())
        .map_err(|e| GenerationError::Failed(format!("Malformed caption payload: {}", e)))?;

    let variants: Vec<CaptionVariant> = envelope
        .variations
        .into_iter()
        .filter(|v| !v.text.trim().is_empty())
        .collect();

    if variants.is_empty() {
        return Err(GenerationError::Failed("No caption variations returned".to_string()));
    }
    Ok(variants)
}

fn image_data_url(response: &GenerateContentResponse) -> GenerationResult<String> {
    let inline = response
        .inline_data()
        .ok_or_else(|| GenerationError::Failed("No image in response".to_string()))?;

    if inline.data.is_empty() || STANDARD.decode(&inline.data).is_err() {
        return Err(GenerationError::Failed("Image payload is not valid base64".to_string()));
    }
    Ok(format!("data:{};base64,{}", inline.mime_type, inline.data))
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    #[instrument(skip(self, topic), fields(model = %self.text_model))]
    async fn captions(&self, topic: &str, platform_label: &str) -> GenerationResult<Vec<CaptionVariant>> {
        let request = GenerateContentRequest::prompt(caption_prompt(topic, platform_label))
            .with_config(caption_schema());
        let response = self.generate_content(&self.text_model, &request).await?;
        let variants = parse_captions(&response.text())?;
        debug!(count = variants.len(), "Received captions");
        Ok(variants)
    }

    #[instrument(skip(self, content), fields(model = %self.text_model, chars = content.chars().count()))]
    async fn summarize(&self, content: &str) -> GenerationResult<String> {
        let request = GenerateContentRequest::prompt(format!(
            "Summarize this social media post content into a single concise version under 140 characters: \"{}\"",
            content
        ));
        let response = self.generate_content(&self.text_model, &request).await?;
        let summary = response.text().trim().to_string();
        if summary.is_empty() {
            return Err(GenerationError::Failed("Empty summary".to_string()));
        }
        Ok(summary)
    }

    #[instrument(skip(self, prompt), fields(model = %self.image_model))]
    async fn image(&self, prompt: &str) -> GenerationResult<String> {
        let request = GenerateContentRequest::prompt(prompt)
            .with_config(json!({"imageConfig": {"aspectRatio": "1:1"}}));
        let response = self.generate_content(&self.image_model, &request).await?;
        image_data_url(&response)
    }

    #[instrument(skip(self, prompt, progress), fields(model = %self.video_model))]
    async fn video(&self, prompt: &str, progress: &ProgressFn) -> GenerationResult<String> {
        progress(VIDEO_STARTING);

        let request = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9",
                resolution: "720p",
                sample_count: 1,
            },
        };
        let url = self.model_url(&self.video_model, "predictLongRunning");
        let mut operation: Operation = self.post_json(&url, &request, true).await?;
        info!(operation = %operation.name, "Video operation started");

        progress(VIDEO_RENDERING);
        while !operation.done {
            tokio::time::sleep(self.poll_interval).await;
            let url = format!("{}/{}", self.base_url, operation.name);
            operation = parse_json(self.get(&url, true).await?).await?;
            progress(VIDEO_POLLING);
        }

        if let Some(err) = operation.error {
            warn!(code = err.code, message = %err.message, "Video operation failed");
            return Err(if err.message.contains(ENTITY_NOT_FOUND) {
                GenerationError::CredentialInvalid(err.message)
            } else {
                GenerationError::Failed(err.message)
            });
        }

        let uri = operation
            .video_uri()
            .ok_or_else(|| GenerationError::Failed("Operation finished without a video".to_string()))?
            .to_string();
        self.download_video(&uri).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
