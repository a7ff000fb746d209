//! Provider traits for reconciliation
//!
//! These traits allow the stepdiff crate to be used without
//! depending on a specific CI client, prompt library, or terminal UI.

use crate::confirm::{Answers, Question};
use crate::types::{StepSpec, UpdateOutcome};
use anyhow::Result;

/// Pushes a new step list to a remote pipeline
///
/// Implementations are called concurrently from worker threads, one call per
/// pipeline.
pub trait StepUpdater: Send + Sync {
    /// Replace the steps of the pipeline identified by `slug`
    fn update_steps(&self, slug: &str, steps: &[StepSpec]) -> Result<()>;
}

/// Progress callback for reconciliation
///
/// Called from worker threads as each update completes.
pub trait ProgressCallback: Send + Sync {
    /// Called once before any update is dispatched
    fn on_start(&self, count: usize);

    /// Called when a pipeline update completes
    fn on_update_complete(&self, slug: &str, outcome: &UpdateOutcome);
}

/// Confirmation callback for user interaction
///
/// Receives every question at once and returns an answer per question name.
pub trait ConfirmCallback {
    /// Ask all questions and collect the answers
    fn confirm_all(&mut self, questions: &[Question]) -> Result<Answers>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&self, _count: usize) {}
    fn on_update_complete(&self, _slug: &str, _outcome: &UpdateOutcome) {}
}

/// Auto-confirm callback (answers yes to everything)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm_all(&mut self, questions: &[Question]) -> Result<Answers> {
        Ok(questions.iter().map(|q| (q.name.clone(), true)).collect())
    }
}

/// Auto-decline callback (answers no to everything)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm_all(&mut self, questions: &[Question]) -> Result<Answers> {
        Ok(questions.iter().map(|q| (q.name.clone(), false)).collect())
    }
}
