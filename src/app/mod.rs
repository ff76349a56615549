use crate::analysis::Analyzer;
use crate::api::{ApiServer, AppState};
use crate::audit::AuditRecorder;
use crate::config::Config;
use crate::generate;
use crate::transcribe::{self, TranscriptionProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub async fn run_service() -> Result<()> {
    info!("Starting lexplain service");

    let config = Config::load()?;

    let audit = AuditRecorder::new(&config.audit.resolve_log_dir()?);
    let analyzer = Arc::new(build_analyzer(&config)?);
    let transcriber: Arc<dyn TranscriptionProvider> =
        Arc::from(transcribe::build_provider(&config.transcription)?);

    let state = AppState {
        analyzer,
        transcriber,
        audit,
    };

    info!("lexplain is ready (session {})", state.audit.session_id());

    ApiServer::new(state, &config.server).start().await
}

fn build_analyzer(config: &Config) -> Result<Analyzer> {
    let provider = generate::build_provider(&config.model)?;
    Ok(Analyzer::new(provider, config.model.max_prompt_chars))
}
