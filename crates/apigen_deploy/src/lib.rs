//! Apigee management API client for Apigen.
//!
//! Imports a rendered proxy as a zip bundle in one authenticated multipart
//! upload. The access token is passed explicitly on every call.
//!
//! # Example
//!
//! ```rust,ignore
//! use apigen_deploy::{DeployConfig, Deployer};
//!
//! let deployer = Deployer::new(DeployConfig { organization: "acme".into(), ..Default::default() })?;
//! let deployment = deployer.deploy(&descriptor, request, None, &token).await?;
//! println!("{}", deployment.test_url);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod error;

pub use client::{DeployConfig, Deployer, Deployment, DEFAULT_BASE_URL, DEFAULT_ENVIRONMENT};
pub use error::{Error, Result};
