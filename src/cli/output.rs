//! Console output helpers for the Svar CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::sync::OnceLock;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a model answer with its timestamp citations highlighted.
    pub fn answer(text: &str) {
        println!("\n{}\n", highlight_timestamps(text));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Color `[MM:SS]` citations in an answer.
///
/// Minutes can exceed two digits since they never roll over into hours.
pub fn highlight_timestamps(text: &str) -> String {
    timestamp_re()
        .replace_all(text, |caps: &regex::Captures| {
            style(&caps[0]).cyan().bold().to_string()
        })
        .into_owned()
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d{2,}:\d{2}\]").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_pattern() {
        let re = timestamp_re();

        let found: Vec<&str> = re
            .find_iter("Greeting at [00:00], an hour in at [60:00].")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["[00:00]", "[60:00]"]);

        // Single-digit minutes and bare numbers are not citations
        assert!(!re.is_match("at [1:05] or [1234]"));
    }

    #[test]
    fn test_highlight_preserves_plain_text() {
        assert_eq!(highlight_timestamps("no citations here"), "no citations here");
    }
}
