//! Apigee descriptor rendering and bundle packaging for Apigen.
//!
//! Rendering is **pure and deterministic**:
//! - No network or disk access
//! - No timestamps or randomness
//! - Same descriptor and request text always produce byte-identical output
//!
//! # Example
//!
//! ```rust
//! use apigen_render::{render, FileRole};
//!
//! let request = "Create a proxy named pets pointing to https://pets.example.com with CORS";
//! let descriptor = apigen_intent::extract(request);
//! let bundle = render(&descriptor, request);
//!
//! assert!(bundle.get(&FileRole::ProxyDescriptor).unwrap().contains(r#"<APIProxy name="pets">"#));
//! assert_eq!(bundle.files()[0].path, "apiproxy/pets.xml");
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

pub mod bundle;
pub mod error;
pub mod flow;
pub mod package;
pub mod preview;
pub mod templates;
pub mod validate;

pub use bundle::{render, BundleFile, FileRole, RenderedBundle};
pub use error::{Error, Result};
pub use flow::{stage_for, FlowStage};
pub use package::{package, write_tree};
pub use preview::generate_preview;
pub use validate::{validate, Warning};
