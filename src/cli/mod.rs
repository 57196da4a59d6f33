//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{highlight_timestamps, Output};

use clap::{Parser, Subcommand};

/// Svar - Transcript-grounded video Q&A
///
/// Paste a video link and ask questions answered strictly from its transcript.
/// The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server and UI
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question about a video
    Ask {
        /// Video URL (youtu.be, watch, embed, or /v/ form)
        url: String,

        /// The question to ask
        question: String,

        /// Session identifier for follow-up questions (generated if omitted)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Start an interactive Q&A session on one video
    Chat {
        /// Video URL to chat about
        url: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "inference.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
