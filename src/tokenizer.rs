//! Token accounting and budget trimming.
//!
//! Chunk sizes and stitched context budgets are measured in tokens. Any
//! deterministic, monotonic counter works as long as the same one is used for a
//! whole index build and every query against it.

use crate::error::{KnowhowError, Result};
use serde::{Deserialize, Serialize};
use tiktoken_rs::{cl100k_base, get_bpe_from_model, o200k_base, CoreBPE};

/// Counts tokens and trims text to a token budget.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`. Empty text has zero tokens.
    fn count_tokens(&self, text: &str) -> usize;

    /// Longest prefix of `text` whose token count is at most `max_tokens`.
    ///
    /// Returns `text` unchanged when it already fits.
    fn trim<'a>(&self, text: &'a str, max_tokens: usize) -> &'a str;
}

/// Which token counter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// Byte-pair encoding, matching what the embedding and chat models see.
    #[default]
    Bpe,
    /// One token per whitespace-separated word.
    Whitespace,
}

impl std::str::FromStr for TokenizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bpe" | "tiktoken" => Ok(TokenizerKind::Bpe),
            "whitespace" | "words" => Ok(TokenizerKind::Whitespace),
            _ => Err(format!("Unknown tokenizer: {}", s)),
        }
    }
}

/// Create a token counter.
///
/// `encoding` is only consulted for [`TokenizerKind::Bpe`].
pub fn create_tokenizer(kind: TokenizerKind, encoding: &str) -> Result<Box<dyn TokenCounter>> {
    match kind {
        TokenizerKind::Bpe => Ok(Box::new(BpeTokenizer::new(encoding)?)),
        TokenizerKind::Whitespace => Ok(Box::new(WhitespaceTokenizer)),
    }
}

/// BPE token counter backed by tiktoken-rs.
pub struct BpeTokenizer {
    bpe: CoreBPE,
}

impl BpeTokenizer {
    /// Load an encoding by name ("cl100k_base", "o200k_base") or by model name.
    pub fn new(encoding: &str) -> Result<Self> {
        let lower = encoding.to_ascii_lowercase();
        let bpe = match lower.as_str() {
            "cl100k_base" => cl100k_base(),
            "o200k_base" => o200k_base(),
            model => get_bpe_from_model(model),
        }
        .map_err(|e| KnowhowError::Config(format!("Unsupported encoding '{}': {}", encoding, e)))?;

        Ok(Self { bpe })
    }
}

impl TokenCounter for BpeTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_ordinary(text).len()
    }

    fn trim<'a>(&self, text: &'a str, max_tokens: usize) -> &'a str {
        let tokens = self.bpe.encode_ordinary(text);
        if tokens.len() <= max_tokens {
            return text;
        }

        // A token prefix may end inside a multi-byte character, and a decoded
        // prefix can re-encode differently; back off until both are fine.
        let mut keep = max_tokens;
        while keep > 0 {
            if let Ok(decoded) = self.bpe.decode(tokens[..keep].to_vec()) {
                if text.starts_with(decoded.as_str()) && self.count_tokens(&decoded) <= max_tokens {
                    return &text[..decoded.len()];
                }
            }
            keep -= 1;
        }
        ""
    }
}

/// Whitespace word counter.
///
/// Cheap and predictable; a poor estimate for languages written without spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl TokenCounter for WhitespaceTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn trim<'a>(&self, text: &'a str, max_tokens: usize) -> &'a str {
        if max_tokens == 0 {
            return "";
        }

        let mut words = 0;
        let mut in_word = false;
        for (pos, c) in text.char_indices() {
            if c.is_whitespace() {
                if in_word {
                    in_word = false;
                    if words == max_tokens {
                        return &text[..pos];
                    }
                }
            } else if !in_word {
                in_word = true;
                words += 1;
            }
        }
        text
    }
}
