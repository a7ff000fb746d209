use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use stepdiff::{STEP_FIELDS, StepSpec};

/// Environment variable consulted when the config has no token
pub const TOKEN_ENV: &str = "BUILDKITE_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("Cannot find buildkite token, either set it in your config file, or set BUILDKITE_TOKEN")]
    MissingToken,
}

impl ConfigError {
    /// Line printed above the error detail, if any
    pub fn headline(&self) -> Option<&'static str> {
        match self {
            Self::Read { .. } | Self::Parse { .. } => {
                Some("There was an error loading your config file:")
            }
            Self::Invalid(_) => Some("Oops, invalid config!"),
            Self::MissingToken => None,
        }
    }
}

// ============================================================================
// Config file
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub org: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub repositories: Option<Repositories>,
    pub step: StepSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Repositories {
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

/// Shape check for the recognized step fields; extra fields are allowed
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct StepSchema {
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    command: Option<String>,
    artifact_paths: Option<String>,
    branch_configuration: Option<String>,
    env: Option<Map<String, Value>>,
    timeout_in_minutes: Option<f64>,
    agent_query_rules: Option<Vec<String>>,
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate config JSON
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        let config: Self =
            serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        StepSchema::deserialize(Value::Object(self.step.clone()))
            .map_err(|e| ConfigError::Invalid(format!("step: {e}")))?;

        for key in self.step.keys() {
            if !STEP_FIELDS.contains(&key.as_str()) {
                log::debug!("step field {key:?} is not recognized, passing it through");
            }
        }
        Ok(())
    }

    /// Pipeline slugs to skip
    pub fn excluded(&self) -> Vec<String> {
        self.repositories
            .as_ref()
            .and_then(|r| r.exclude.clone())
            .unwrap_or_default()
    }

    /// Resolve the token and build the run context.
    ///
    /// `env_token` is the value of `BUILDKITE_TOKEN`, consulted only when the
    /// config has no (or an empty) token.
    pub fn into_context(self, env_token: Option<String>) -> Result<RunContext, ConfigError> {
        let exclude = self.excluded();
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .or_else(|| env_token.filter(|t| !t.is_empty()))
            .ok_or(ConfigError::MissingToken)?;

        Ok(RunContext {
            org: self.org,
            token,
            exclude,
            step: self.step,
        })
    }
}

// ============================================================================
// Run context
// ============================================================================

/// Everything one sync run needs, resolved from the config and environment
#[derive(Debug, Clone)]
pub struct RunContext {
    pub org: String,
    pub token: String,
    pub exclude: Vec<String>,
    /// Desired step as written in the config
    pub step: StepSpec,
}

impl RunContext {
    pub fn is_excluded(&self, slug: &str) -> bool {
        self.exclude.iter().any(|s| s == slug)
    }
}
