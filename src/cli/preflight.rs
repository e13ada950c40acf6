//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::error::{KnowhowError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Search embeds the corpus and the query, so it needs an API key.
    Search,
    /// Chunk reports only count tokens.
    Chunks,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Search => check_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()),
        Operation::Chunks => Ok(()),
    }
}

/// Check that an OpenAI API key is configured.
fn check_api_key(key: Option<&str>) -> Result<()> {
    match key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(KnowhowError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        None => Err(KnowhowError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_chunks_no_requirements() {
        assert!(check(Operation::Chunks).is_ok());
    }

    #[test]
    fn test_api_key() {
        assert!(check_api_key(Some("sk-test")).is_ok());
        assert!(check_api_key(Some("  ")).is_err());
        assert!(check_api_key(None).is_err());
    }
}
