//! Svar - Transcript-grounded video Q&A
//!
//! Paste a video link, ask questions, and get answers grounded strictly in
//! that video's transcript.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Resolve a YouTube URL to its video identifier
//! - Fetch the video's caption track as a timestamped transcript
//! - Ask questions answered only from the transcript, with `[MM:SS]` citations
//! - Hold a short follow-up conversation per session
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `video_url` - Video URL to identifier resolution
//! - `transcript` - Transcript model and caption fetching
//! - `prompt` - Grounded prompt construction
//! - `inference` - LLM chat completion client
//! - `session` - Per-session conversation state
//! - `orchestrator` - Request composition
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let answer = orchestrator
//!         .ask(
//!             "https://youtu.be/dQw4w9WgXcQ",
//!             "What is discussed at the start?",
//!             "my-session",
//!         )
//!         .await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod transcript;
pub mod video_url;

pub use error::{Result, SvarError};
