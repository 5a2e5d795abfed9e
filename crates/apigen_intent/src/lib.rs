//! Proxy descriptor model and request extraction for Apigen.
//!
//! This crate provides:
//! - The typed [`ProxyDescriptor`] record and its policy set
//! - Ordered-pattern extraction from free text with deterministic defaults
//! - The [`Extractor`] seam shared by the regex and language-model paths
//!
//! # Example
//!
//! ```rust
//! use apigen_intent::{extract, PolicyKind};
//!
//! let descriptor = extract(
//!     "Create an Apigee API proxy named booking-api with base path /booking \
//!      pointing to https://backend.example.com/api. Add a VerifyAPIKey policy to all requests.",
//! );
//!
//! assert_eq!(descriptor.name, "booking-api");
//! assert_eq!(descriptor.base_path, "/booking");
//! assert!(descriptor.policies.contains(&PolicyKind::VerifyApiKey));
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod extract;
pub mod model;

pub use error::{Error, Result};
pub use extract::{
    extract, extract_transformation_intent, spike_rate, Extractor, RegexExtractor,
    POLICY_PHRASES,
};
pub use model::{PolicyKind, PolicySet, ProxyDescriptor};
