//! Interactive Q&A session on one video.

use crate::cli::preflight::{self, Operation};
use crate::cli::{highlight_timestamps, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(url: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let session_id = uuid::Uuid::new_v4().to_string();

    println!("\n{}", style("Svar Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about the video, or 'exit' to quit. Use 'clear' to reset the conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            orchestrator.sessions().clear_history(&session_id).await;
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        match orchestrator.ask(url, input, &session_id).await {
            Ok(answer) => {
                spinner.finish_and_clear();
                println!(
                    "\n{} {}\n",
                    style("Svar:").cyan().bold(),
                    highlight_timestamps(&answer.answer)
                );
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("{}", e));
            }
        }
    }

    // The session is single-use; drop it rather than waiting for expiry
    orchestrator.sessions().remove(&session_id);

    Ok(())
}
