//! Confirmation gate - one yes/no question per pipeline with changes

use std::collections::HashMap;

use anyhow::Result;
use log::debug;

use crate::context::ConfirmCallback;
use crate::types::{ChangeEntry, ChangeSet};

/// Answers keyed by question name (the pipeline slug)
pub type Answers = HashMap<String, bool>;

/// A yes/no question about one pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Pipeline slug
    pub name: String,
    /// Full prompt text, including the diff summary
    pub message: String,
}

/// Build one question per pipeline in the change set, in change set order
pub fn build_questions<F>(changes: &ChangeSet, render: F) -> Vec<Question>
where
    F: Fn(&str, &[ChangeEntry]) -> String,
{
    changes
        .iter()
        .map(|(slug, entries)| Question {
            name: slug.clone(),
            message: render(slug, entries),
        })
        .collect()
}

/// Drop every pipeline whose answer is not an explicit yes
pub fn retain_confirmed(changes: &mut ChangeSet, answers: &Answers) {
    changes.retain(|slug, _| {
        let keep = answers.get(slug).copied().unwrap_or(false);
        if !keep {
            debug!("{slug} declined");
        }
        keep
    });
}

/// Ask about every pipeline in one batch and keep only the confirmed ones
pub fn confirm_changes<F, C>(mut changes: ChangeSet, render: F, confirm: &mut C) -> Result<ChangeSet>
where
    F: Fn(&str, &[ChangeEntry]) -> String,
    C: ConfirmCallback + ?Sized,
{
    if changes.is_empty() {
        return Ok(changes);
    }

    let questions = build_questions(&changes, render);
    let answers = confirm.confirm_all(&questions)?;
    retain_confirmed(&mut changes, &answers);
    Ok(changes)
}
