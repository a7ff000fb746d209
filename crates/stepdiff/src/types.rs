//! Core types for step change detection and reconciliation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value::render_value;

/// A step definition: an insertion-ordered mapping of field name to value
pub type StepSpec = Map<String, Value>;

/// Field names recognized in a step definition
pub const STEP_FIELDS: &[&str] = &[
    "type",
    "name",
    "command",
    "artifact_paths",
    "branch_configuration",
    "env",
    "timeout_in_minutes",
    "agent_query_rules",
];

/// Marker shown for a field with no (or a falsy) current value
pub const NOT_SET: &str = "Not Set";

/// A pipeline as seen by the differ: its slug and its first step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// Unique pipeline identifier
    pub slug: String,
    /// Current first step (empty when the pipeline has no steps)
    pub step: StepSpec,
}

impl PipelineState {
    pub fn new(slug: impl Into<String>, step: StepSpec) -> Self {
        Self {
            slug: slug.into(),
            step,
        }
    }
}

/// One field whose desired value differs from the pipeline's current value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Field name
    pub key: String,
    /// Current value, `None` when absent or falsy
    pub old: Option<Value>,
    /// Desired value
    pub new: Value,
}

impl ChangeEntry {
    /// Human-readable current value ("Not Set" when unset)
    pub fn old_display(&self) -> String {
        self.old
            .as_ref()
            .map_or_else(|| NOT_SET.to_string(), render_value)
    }

    /// Human-readable desired value
    pub fn new_display(&self) -> String {
        render_value(&self.new)
    }
}

/// Pipeline slug to its ordered changes; only pipelines with changes appear
pub type ChangeSet = IndexMap<String, Vec<ChangeEntry>>;

/// Result of running the change aggregator over all pipelines
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Canonical desired step, back-filled from the first pipeline
    pub step: StepSpec,
    /// Per-pipeline changes
    pub changes: ChangeSet,
}

impl Aggregation {
    /// No pipeline needs an update
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Total number of field changes across all pipelines
    pub fn total_changes(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }
}

/// A failed pipeline update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFailure {
    pub pipeline_name: String,
    pub error: String,
}

/// Outcome of a single pipeline update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOutcome {
    /// Pipeline steps replaced
    Updated,
    /// Update failed
    Failed { error: String },
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Updated)
    }
}

/// Summary of a reconciliation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Slugs updated successfully, in completion order
    pub succeeded: Vec<String>,
    /// Failed updates, in completion order
    pub failures: Vec<UpdateFailure>,
}

impl ReconcileReport {
    /// Check if every dispatched update succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of updates attempted
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    /// Record the outcome of one pipeline update
    pub fn add_outcome(&mut self, slug: &str, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Updated => self.succeeded.push(slug.to_string()),
            UpdateOutcome::Failed { error } => self.failures.push(UpdateFailure {
                pipeline_name: slug.to_string(),
                error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_entry_display() {
        let entry = ChangeEntry {
            key: "command".into(),
            old: None,
            new: json!("run.sh"),
        };
        assert_eq!(entry.old_display(), "Not Set");
        assert_eq!(entry.new_display(), "run.sh");

        let entry = ChangeEntry {
            key: "timeout_in_minutes".into(),
            old: Some(json!(10)),
            new: json!(30),
        };
        assert_eq!(entry.old_display(), "10");
        assert_eq!(entry.new_display(), "30");
    }

    #[test]
    fn test_report_add_outcome() {
        let mut report = ReconcileReport::default();
        report.add_outcome("a", UpdateOutcome::Updated);
        report.add_outcome(
            "b",
            UpdateOutcome::Failed {
                error: "HTTP 422".into(),
            },
        );

        assert_eq!(report.total(), 2);
        assert!(!report.is_success());
        assert_eq!(report.succeeded, vec!["a".to_string()]);
        assert_eq!(
            report.failures,
            vec![UpdateFailure {
                pipeline_name: "b".into(),
                error: "HTTP 422".into(),
            }]
        );
    }

    #[test]
    fn test_aggregation_totals() {
        let mut agg = Aggregation::default();
        assert!(agg.is_empty());

        agg.changes.insert(
            "a".into(),
            vec![ChangeEntry {
                key: "command".into(),
                old: None,
                new: json!("x"),
            }],
        );
        assert!(!agg.is_empty());
        assert_eq!(agg.total_changes(), 1);
    }
}
