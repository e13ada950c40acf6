//! Retrieval context for question answering.
//!
//! Turns ranked chunks into stitched blocks of neighbouring transcript context,
//! ready to hand to a prompt.

pub mod context;
mod stitch;

pub use context::{format_blocks_for_display, format_blocks_for_prompt, ContextBuilder};
pub use stitch::{stitch, StitchedBlock};
