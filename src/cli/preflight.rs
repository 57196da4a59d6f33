//! Pre-flight checks before operations that call the inference API.
//!
//! Catches missing credentials or assets up front, before a command gets
//! halfway through a request and fails with a less helpful message.

use crate::config::Settings;
use crate::error::{Result, SvarError};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions needs the inference API credential.
    Ask,
    /// Serving needs the credential plus the UI shell on disk.
    Serve,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask => check_api_key(),
        Operation::Serve => {
            check_api_key()?;
            check_static_dir(&settings.static_dir())
        }
    }
}

fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(SvarError::Config(
            "OPENAI_API_KEY is not set. Export it or add it to a .env file.".to_string(),
        )),
    }
}

fn check_static_dir(dir: &Path) -> Result<()> {
    if dir.join("index.html").is_file() {
        Ok(())
    } else {
        Err(SvarError::Config(format!(
            "No UI shell at {}. Point server.static_dir at a directory containing index.html.",
            dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_dir_check() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_static_dir(dir.path()).is_err());

        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        assert!(check_static_dir(dir.path()).is_ok());
    }
}
