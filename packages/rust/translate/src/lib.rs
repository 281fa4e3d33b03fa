//! Batch translation through an external text-generation service.
//!
//! This crate provides:
//! - [`Translator`] / [`AnthropicTranslator`]: the service seam and its HTTP client
//! - [`system_prompt`] / [`batch_prompt`]: prompt construction for one batch
//! - [`parse_batch_response`]: tolerant parsing of the CSV rows that come back
//!
//! Batching, retry and persistence live in the core pipeline.

mod client;
mod parser;
mod prompt;

pub use client::{AnthropicTranslator, Translator};
pub use parser::{ParsedRow, parse_batch_response};
pub use prompt::{batch_prompt, system_prompt};
