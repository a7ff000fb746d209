//! # Stepdiff
//!
//! Change detection and reconciliation for a single CI step shared by many
//! pipelines.
//!
//! ## Core Concepts
//!
//! - **StepSpec**: An ordered JSON object describing a step
//! - **ChangeEntry / ChangeSet**: Field-level differences per pipeline
//! - **Aggregation**: The canonical step plus every pipeline's changes
//! - **Reconcile**: Push the canonical step to confirmed pipelines in parallel
//!
//! ## Example
//!
//! ```ignore
//! use stepdiff::{
//!     AutoConfirm, NoProgress, PipelineState, StepUpdater,
//!     aggregate_changes, confirm_changes, reconcile,
//! };
//!
//! let pipelines = vec![PipelineState::new("api", current_step)];
//! let agg = aggregate_changes(&pipelines, desired_step);
//! if agg.is_empty() {
//!     return Ok(());
//! }
//!
//! let confirmed = confirm_changes(agg.changes, |slug, _| slug.to_string(), &mut AutoConfirm)?;
//! let report = reconcile(&confirmed, &pipelines, &agg.step, &updater, &NoProgress)?;
//! ```
//!
//! ## Provider Traits
//!
//! - [`StepUpdater`]: Pushes steps to the remote service
//! - [`ProgressCallback`]: Receives per-pipeline outcomes
//! - [`ConfirmCallback`]: Answers the per-pipeline questions

pub mod confirm;
pub mod context;
pub mod diff;
pub mod executor;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use confirm::{Answers, Question, build_questions, confirm_changes, retain_confirmed};
pub use context::{
    AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback, StepUpdater,
};
pub use diff::{aggregate_changes, diff_step, merge_missing};
pub use executor::reconcile;
pub use types::{
    Aggregation, ChangeEntry, ChangeSet, NOT_SET, PipelineState, ReconcileReport, STEP_FIELDS,
    StepSpec, UpdateFailure, UpdateOutcome,
};
pub use value::{deep_equal, is_falsy, render_value};
