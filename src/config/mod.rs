//! Configuration module for knowhow.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, RetrievalSettings, Settings,
    TokenizerSettings,
};
