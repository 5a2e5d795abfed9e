//! Chat boundary for Apigen.
//!
//! Two modes:
//! - **ask**: documentation questions answered by the model
//! - **agent**: creation requests become a previewed proxy awaiting
//!   confirmation; other messages are answered like ask mode
//!
//! A confirmed `create_proxy` action is deployed with an explicitly supplied
//! token. Failures come back as unsuccessful responses, never as errors.
//!
//! # Example
//!
//! ```rust
//! use apigen_assist::{Assistant, AssistantConfig, ChatMode, ChatRequest};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let assistant = Assistant::new(AssistantConfig::default());
//! let response = runtime.block_on(assistant.chat(ChatRequest {
//!     message: "Create a proxy named pets with CORS".to_string(),
//!     mode: ChatMode::Agent,
//!     ..Default::default()
//! }));
//! assert!(response.requires_confirmation);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod assistant;
pub mod error;
pub mod message;

pub use assistant::{is_creation_request, Assistant, AssistantConfig, APOLOGY, TIMEOUT_MESSAGE};
pub use error::{Error, Result};
pub use message::{
    ChatMode, ChatRequest, ChatResponse, ConfirmationRequest, ConfirmationResponse,
    CreateProxyDetails, HealthReport, CREATE_PROXY_ACTION,
};
