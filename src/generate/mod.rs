use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::config::ModelConfig;

pub mod providers;

pub use providers::AnthropicProvider;

/// A text-generation backend: prompt in, raw free-text completion out.
///
/// Implementations own connectivity and auth; they do not interpret the
/// completion. Structured-output recovery happens in the caller.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Model identifier recorded in audit entries.
    fn model_id(&self) -> &str;

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Build the configured provider, or fail at startup with the list of
/// supported names.
pub fn build_provider(config: &ModelConfig) -> Result<Box<dyn GenerativeProvider>> {
    let provider: Box<dyn GenerativeProvider> = match config.provider.as_str() {
        "anthropic" => {
            let api_key = config
                .resolve_api_key()
                .context("api_key (or ANTHROPIC_API_KEY) is required for the anthropic provider")?;

            Box::new(AnthropicProvider::new(
                api_key,
                config.model_id.clone(),
                config.endpoint.clone(),
            )?)
        }
        other => bail!(
            "Unknown generative provider '{}'. Supported providers: anthropic",
            other
        ),
    };

    info!("Using {} for text generation", provider.name());

    Ok(provider)
}
