//! Summarization of extracted content.
//!
//! The summarizer is an OpenAI-compatible chat completion call. It consumes
//! a subset of a [`ContentRecord`](crate::extractor::ContentRecord) and
//! returns a structured [`Digest`].

pub mod client;
pub mod errors;
pub mod markdown;
pub mod model;
pub mod parse;
pub mod prompt;

pub use client::Summarizer;
pub use errors::SummarizeError;
pub use model::{Digest, SummaryInput};
