use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, error, info};

use crate::transcribe::TranscriptionProvider;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub struct OpenAiWhisperProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiWhisperProvider {
    pub fn new(api_key: String, model: String, endpoint: Option<String>) -> Result<Self> {
        let client = reqwest::Client::new();
        let endpoint = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        info!(
            "Initialized Whisper provider for model {} at {}",
            model, endpoint
        );

        Ok(Self {
            client,
            api_key,
            model,
            endpoint,
        })
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiWhisperProvider {
    fn name(&self) -> &'static str {
        "OpenAI Whisper API"
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        info!("Transcribing audio file via Whisper API: {:?}", audio_path);

        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let audio_data = tokio::fs::read(audio_path)
            .await
            .context("Failed to read audio file")?;

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio_data).file_name(file_name),
            )
            .text("model", self.model.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to Whisper API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            error!(
                "Whisper API request failed with status {}: {}",
                status, response_text
            );

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
                return Err(anyhow::anyhow!(
                    "Whisper API error: {} (type: {:?})",
                    error_response.error.message,
                    error_response.error.kind
                ));
            }

            return Err(anyhow::anyhow!(
                "Whisper API request failed with status {}: {}",
                status,
                response_text
            ));
        }

        // response_format=text returns the transcript body directly.
        let transcript = response_text.trim().to_string();
        info!("Transcription complete: {} chars", transcript.len());
        debug!("Raw transcription: {}", transcript);

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_parsing() {
        let raw = r#"{"error": {"message": "Invalid file format.", "type": "invalid_request_error"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "Invalid file format.");
    }
}
