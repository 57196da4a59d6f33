//! Configuration module for Svar.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GroundingPrompts, Prompts};
pub use settings::{
    GeneralSettings, InferenceSettings, PromptSettings, ServerSettings, SessionSettings,
    Settings, TranscriptSettings,
};
