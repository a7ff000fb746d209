//! Execution engine for stepsync
//!
//! The engine covers the interactive half of a run:
//! 1. Rendering - Show each pipeline's field changes
//! 2. Confirming - Ask once per pipeline, collect every answer
//! 3. Executing - Push the canonical step in parallel and report

pub mod confirm;
pub mod differ;
pub mod executor;

pub use confirm::{DialoguerConfirm, confirm_changes};
pub use executor::execute;
