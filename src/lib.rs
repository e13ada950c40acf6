//! knowhow - Hybrid retrieval over work-conversation transcripts
//!
//! A CLI tool and library that finds the passages of a transcript collection
//! relevant to a query and hands them back with their surrounding context.
//!
//! # Overview
//!
//! knowhow:
//! - Splits transcripts into overlapping, token-bounded chunks
//! - Scores chunks with BM25 and with embedding cosine similarity
//! - Fuses the two after min-max normalization
//! - Stitches each hit together with its neighbouring chunks
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `tokenizer` - Token counting and trimming
//! - `transcript` - Transcript loading
//! - `chunking` - Token-window chunking with overlap
//! - `corpus` - The chunked corpus indexes are built over
//! - `embedding` - Embedding generation
//! - `search` - Lexical, semantic and hybrid ranking
//! - `rag` - Neighbour stitching and prompt context
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use knowhow::config::Settings;
//! use knowhow::orchestrator::Orchestrator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let corpus = orchestrator.load_corpus(&["standups/".into()])?;
//!     let index = Arc::new(orchestrator.build_index(corpus).await?);
//!     let blocks = orchestrator.context_builder(index).build("who owns the deploy?").await?;
//!     println!("{}", knowhow::rag::format_blocks_for_prompt(&blocks));
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod search;
pub mod tokenizer;
pub mod transcript;

pub use error::{KnowhowError, Result};
