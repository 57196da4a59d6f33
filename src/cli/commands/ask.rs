//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    url: &str,
    question: &str,
    session: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let spinner = Output::spinner("Fetching transcript and thinking...");

    match orchestrator.ask(url, question, &session_id).await {
        Ok(answer) => {
            spinner.finish_and_clear();

            Output::answer(&answer.answer);

            Output::kv("Video", &answer.video_id);
            Output::kv("Session", &answer.session_id);
            Output::info("Re-run with --session to ask a follow-up.");
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
