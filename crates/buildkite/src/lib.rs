//! # buildkite
//!
//! Minimal blocking client for the Buildkite REST API.
//!
//! This crate provides functionality for:
//! - Looking up an organization
//! - Listing every pipeline in an organization (all pages)
//! - Replacing a pipeline's step list
//!
//! ## Example
//!
//! ```no_run
//! use buildkite::backend::{PipelineService, rest::RestBackend};
//!
//! let backend = RestBackend::new("bkua_token");
//! backend.organization("acme").expect("organization lookup failed");
//!
//! for pipeline in backend.list_pipelines("acme").expect("listing failed") {
//!     println!("{} ({} steps)", pipeline.slug, pipeline.steps.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::rest::{DEFAULT_API_BASE, RestBackend};
pub use backend::{MockService, PipelineService, RecordedUpdate};
pub use error::{Error, Result};
pub use types::{Organization, Pipeline, UpdateSteps};
