use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::TranscriptionConfig;

pub mod providers;

pub use providers::OpenAiWhisperProvider;

/// Speech-to-text backend for uploaded courtroom audio.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

pub fn build_provider(config: &TranscriptionConfig) -> Result<Box<dyn TranscriptionProvider>> {
    let provider: Box<dyn TranscriptionProvider> = match config.provider.as_str() {
        "openai-whisper" => {
            let api_key = config.resolve_api_key().context(
                "api_key (or OPENAI_API_KEY) is required for the openai-whisper provider",
            )?;

            Box::new(OpenAiWhisperProvider::new(
                api_key,
                config.model.clone(),
                config.endpoint.clone(),
            )?)
        }
        other => bail!(
            "Unknown transcription provider '{}'. Supported providers: openai-whisper",
            other
        ),
    };

    info!("Using {} for transcription", provider.name());

    Ok(provider)
}
