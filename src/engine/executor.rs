//! Execution engine - pushes the canonical step with terminal progress

use anyhow::Result;
use buildkite::PipelineService;
use colored::Colorize;
use stepdiff::{
    ChangeSet, PipelineState, ProgressCallback, ReconcileReport, StepSpec, StepUpdater,
    UpdateOutcome,
};

use crate::ui;

/// Routes step updates for one organization to a [`PipelineService`]
pub struct RemoteUpdater<'a, S: PipelineService + ?Sized> {
    service: &'a S,
    org: &'a str,
}

impl<'a, S: PipelineService + ?Sized> RemoteUpdater<'a, S> {
    pub fn new(service: &'a S, org: &'a str) -> Self {
        Self { service, org }
    }
}

impl<S: PipelineService + ?Sized> StepUpdater for RemoteUpdater<'_, S> {
    fn update_steps(&self, slug: &str, steps: &[StepSpec]) -> Result<()> {
        self.service.update_pipeline_steps(self.org, slug, steps)?;
        Ok(())
    }
}

/// Prints one line per finished update
struct TerminalProgress;

impl ProgressCallback for TerminalProgress {
    fn on_start(&self, count: usize) {
        println!();
        println!(
            "  {} Updating {}...",
            "→".cyan(),
            ui::plural(count, "pipeline")
        );
    }

    fn on_update_complete(&self, slug: &str, outcome: &UpdateOutcome) {
        match outcome {
            UpdateOutcome::Updated => println!("{}", format!("✓ {slug}").green()),
            UpdateOutcome::Failed { .. } => eprintln!("{}", format!("✘ {slug}").red()),
        }
    }
}

/// Update every confirmed pipeline, then print the report
pub fn execute<S: PipelineService + ?Sized>(
    changes: &ChangeSet,
    pipelines: &[PipelineState],
    step: &StepSpec,
    service: &S,
    org: &str,
) -> Result<ReconcileReport> {
    let updater = RemoteUpdater::new(service, org);
    let report = stepdiff::reconcile(changes, pipelines, step, &updater, &TerminalProgress)?;
    print_report(&report);
    Ok(report)
}

/// Print failures in detail, or a success line
fn print_report(report: &ReconcileReport) {
    println!();
    if report.is_success() {
        println!("{}", "All done!".green());
        return;
    }

    for failure in &report.failures {
        eprintln!("Error updating {}:", failure.pipeline_name);
        eprintln!("  {}", failure.error);
    }
    println!();
    ui::warn(&format!(
        "{} updated, {} failed",
        ui::plural(report.succeeded.len(), "pipeline"),
        report.failures.len().to_string().red()
    ));
}
