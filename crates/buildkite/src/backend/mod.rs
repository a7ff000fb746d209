//! Service trait and implementations for reading and updating pipelines.
//!
//! The primary implementation is [`rest::RestBackend`], which talks to the
//! Buildkite REST API.
//!
//! # Testing
//!
//! Use [`MockService`] for testing without network access:
//!
//! ```
//! use buildkite::backend::{MockService, PipelineService};
//! use buildkite::Pipeline;
//!
//! let mock = MockService::new("acme");
//! mock.add_pipeline(Pipeline::new("api", vec![]));
//!
//! let pipelines = mock.list_pipelines("acme").unwrap();
//! assert_eq!(pipelines.len(), 1);
//! ```

pub mod rest;

use crate::error::{Error, Result};
use crate::types::{Organization, Pipeline};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Operations on an organization's pipelines.
///
/// Implementations must be shareable across threads: updates for different
/// pipelines are issued concurrently.
pub trait PipelineService: Send + Sync {
    /// Look up an organization by slug.
    ///
    /// # Errors
    ///
    /// Returns `Error::OrganizationNotFound` if the organization is unknown.
    fn organization(&self, org: &str) -> Result<Organization>;

    /// List every pipeline in the organization, in API order.
    fn list_pipelines(&self, org: &str) -> Result<Vec<Pipeline>>;

    /// Replace a pipeline's step list.
    fn update_pipeline_steps(&self, org: &str, slug: &str, steps: &[Map<String, Value>])
    -> Result<()>;
}

/// A recorded call to [`PipelineService::update_pipeline_steps`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    /// Pipeline slug.
    pub slug: String,
    /// Steps sent.
    pub steps: Vec<Map<String, Value>>,
}

/// In-memory service for testing without network access.
///
/// Updates are recorded and applied to the stored pipelines, and can be
/// configured to fail for specific slugs.
#[derive(Debug, Clone, Default)]
pub struct MockService {
    org: String,
    pipelines: Arc<Mutex<Vec<Pipeline>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    updates: Arc<Mutex<Vec<RecordedUpdate>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockService {
    /// Create an empty mock for the given organization slug.
    #[must_use]
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            ..Self::default()
        }
    }

    /// Add a pipeline.
    pub fn add_pipeline(&self, pipeline: Pipeline) {
        lock(&self.pipelines).push(pipeline);
    }

    /// Make updates of the given pipeline fail.
    pub fn fail_updates_for(&self, slug: impl Into<String>) {
        lock(&self.failing).insert(slug.into());
    }

    /// Every update received so far, in call order.
    #[must_use]
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        lock(&self.updates).clone()
    }

    /// Current state of a stored pipeline.
    #[must_use]
    pub fn pipeline(&self, slug: &str) -> Option<Pipeline> {
        lock(&self.pipelines).iter().find(|p| p.slug == slug).cloned()
    }

    fn check_org(&self, org: &str) -> Result<()> {
        if org == self.org {
            Ok(())
        } else {
            Err(Error::OrganizationNotFound(org.to_string()))
        }
    }
}

impl PipelineService for MockService {
    fn organization(&self, org: &str) -> Result<Organization> {
        self.check_org(org)?;
        Ok(Organization {
            slug: self.org.clone(),
            name: self.org.clone(),
        })
    }

    fn list_pipelines(&self, org: &str) -> Result<Vec<Pipeline>> {
        self.check_org(org)?;
        Ok(lock(&self.pipelines).clone())
    }

    fn update_pipeline_steps(
        &self,
        org: &str,
        slug: &str,
        steps: &[Map<String, Value>],
    ) -> Result<()> {
        self.check_org(org)?;
        lock(&self.updates).push(RecordedUpdate {
            slug: slug.to_string(),
            steps: steps.to_vec(),
        });

        if lock(&self.failing).contains(slug) {
            return Err(Error::http("HTTP 422 Unprocessable Entity", Some(422)));
        }

        let mut pipelines = lock(&self.pipelines);
        let pipeline = pipelines
            .iter_mut()
            .find(|p| p.slug == slug)
            .ok_or_else(|| Error::PipelineNotFound(slug.to_string()))?;
        pipeline.steps = steps.to_vec();
        Ok(())
    }
}
