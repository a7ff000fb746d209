//! Core types for Buildkite pipelines.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Buildkite organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// URL-safe identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
}

/// A pipeline and its step list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    /// Unique identifier within the organization.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Steps in pipeline order. Non-object entries returned by the API are
    /// dropped.
    pub steps: Vec<Map<String, Value>>,
}

impl Pipeline {
    /// Create a pipeline with the given steps; the name defaults to the slug.
    pub fn new(slug: impl Into<String>, steps: Vec<Map<String, Value>>) -> Self {
        let slug = slug.into();
        Self {
            name: slug.clone(),
            slug,
            steps,
        }
    }

    /// The first step, if the pipeline has any.
    #[must_use]
    pub fn first_step(&self) -> Option<&Map<String, Value>> {
        self.steps.first()
    }
}

/// Body of a pipeline step update.
#[derive(Debug, Serialize)]
pub struct UpdateSteps<'a> {
    /// Replacement step list.
    pub steps: &'a [Map<String, Value>],
}

// =============================================================================
// Buildkite API response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ApiOrganization {
    pub(crate) slug: String,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPipeline {
    pub(crate) slug: String,
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) steps: Option<Vec<Value>>,
}

impl From<ApiOrganization> for Organization {
    fn from(o: ApiOrganization) -> Self {
        Self {
            name: o.name.unwrap_or_else(|| o.slug.clone()),
            slug: o.slug,
        }
    }
}

impl From<ApiPipeline> for Pipeline {
    fn from(p: ApiPipeline) -> Self {
        let steps = p
            .steps
            .unwrap_or_default()
            .into_iter()
            .filter_map(|step| match step {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Self {
            name: p.name.unwrap_or_else(|| p.slug.clone()),
            slug: p.slug,
            steps,
        }
    }
}
