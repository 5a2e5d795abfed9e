//! Claude API client for Apigen.
//!
//! This crate provides:
//! - Claude Messages API client
//! - Few-shot prompt building for request parsing
//! - JSON extraction from model replies
//! - [`LlmExtractor`], a language-model [`apigen_intent::Extractor`] that falls
//!   back to pattern extraction whenever the model output is unusable
//!
//! # Example
//!
//! ```rust,ignore
//! use apigen_intent::Extractor;
//! use apigen_llm::{Client, ClientConfig, LlmExtractor};
//!
//! let client = Client::new(ClientConfig { api_key, ..Default::default() })?;
//! let descriptor = LlmExtractor::new(client).extract(request).await;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod error;
pub mod extractor;
pub mod prompt;
pub mod response;

pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use extractor::{LlmExtractor, ParsedRequest};
