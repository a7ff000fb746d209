//! Buildkite REST API backend.
//!
//! This module provides the [`RestBackend`] implementation that talks to
//! `https://api.buildkite.com/v2` with a bearer token.
//!
//! # Tokens
//!
//! Listing pipelines needs the `read_pipelines` scope; updating them needs
//! `write_pipelines`.

use crate::backend::PipelineService;
use crate::error::{Error, Result};
use crate::types::{ApiOrganization, ApiPipeline, Organization, Pipeline, UpdateSteps};
use log::{debug, trace};
use serde_json::{Map, Value};

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.buildkite.com/v2";

/// Page size used when listing pipelines (the API maximum).
const PER_PAGE: usize = 100;

/// Buildkite REST API backend.
///
/// # Example
///
/// ```no_run
/// use buildkite::backend::rest::RestBackend;
/// use buildkite::backend::PipelineService;
///
/// let backend = RestBackend::new("bkua_token");
/// let pipelines = backend.list_pipelines("acme").unwrap();
/// println!("Found {} pipelines", pipelines.len());
/// ```
pub struct RestBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL, without a trailing slash.
    api_base: String,
    /// Precomputed `Authorization` header value.
    authorization: String,
}

impl RestBackend {
    /// Create a backend for the public API.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a backend with a custom API base (for testing or proxies).
    #[must_use]
    pub fn with_api_base(token: &str, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        Self {
            agent: ureq::Agent::new_with_defaults(),
            api_base: api_base.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {token}"),
        }
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build the API URL for an organization.
    fn organization_url(&self, org: &str) -> String {
        format!("{}/organizations/{}", self.api_base, org)
    }

    /// Build the API URL for an organization's pipelines.
    fn pipelines_url(&self, org: &str) -> String {
        format!("{}/organizations/{}/pipelines", self.api_base, org)
    }

    /// Build the API URL for a single pipeline.
    fn pipeline_url(&self, org: &str, slug: &str) -> String {
        format!("{}/organizations/{}/pipelines/{}", self.api_base, org, slug)
    }

    fn fetch_page(&self, org: &str, page: usize) -> Result<Vec<Pipeline>> {
        let url = self.pipelines_url(org);
        trace!("GET {url} page={page}");

        let response: Vec<ApiPipeline> = self
            .agent
            .get(&url)
            .query("page", page.to_string())
            .query("per_page", PER_PAGE.to_string())
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .call()?
            .body_mut()
            .read_json()?;

        Ok(response.into_iter().map(Into::into).collect())
    }
}

impl PipelineService for RestBackend {
    fn organization(&self, org: &str) -> Result<Organization> {
        let url = self.organization_url(org);
        trace!("GET {url}");

        let response = self
            .agent
            .get(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .call();

        let response: ApiOrganization = match response {
            Ok(mut response) => response.body_mut().read_json()?,
            Err(e) => {
                let err = Error::from(e);
                if err.is_not_found() {
                    return Err(Error::OrganizationNotFound(org.to_string()));
                }
                return Err(err);
            }
        };

        Ok(response.into())
    }

    fn list_pipelines(&self, org: &str) -> Result<Vec<Pipeline>> {
        let mut pipelines = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.fetch_page(org, page)?;
            let last = batch.len() < PER_PAGE;
            pipelines.extend(batch);
            if last {
                break;
            }
            page += 1;
        }

        debug!("fetched {} pipeline(s) for {org} in {page} page(s)", pipelines.len());
        Ok(pipelines)
    }

    fn update_pipeline_steps(
        &self,
        org: &str,
        slug: &str,
        steps: &[Map<String, Value>],
    ) -> Result<()> {
        let url = self.pipeline_url(org, slug);
        trace!("PATCH {url}");

        let result = self
            .agent
            .patch(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .send_json(UpdateSteps { steps });

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = Error::from(e);
                if err.is_not_found() {
                    return Err(Error::PipelineNotFound(slug.to_string()));
                }
                Err(err)
            }
        }
    }
}
