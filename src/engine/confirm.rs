//! Interactive confirmation of per-pipeline updates

use anyhow::Result;
use dialoguer::Confirm;
use stepdiff::{Answers, ChangeSet, ConfirmCallback, Question};

use super::differ::step_diff_message;

/// Asks each question on the terminal; all answers are collected before
/// anything is updated
pub struct DialoguerConfirm;

impl ConfirmCallback for DialoguerConfirm {
    fn confirm_all(&mut self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::with_capacity(questions.len());
        for question in questions {
            let confirmed = Confirm::new()
                .with_prompt(&question.message)
                .default(true)
                .interact()?;
            answers.insert(question.name.clone(), confirmed);
        }
        Ok(answers)
    }
}

/// Ask about every pipeline with changes and keep the confirmed ones
pub fn confirm_changes<C>(changes: ChangeSet, confirm: &mut C) -> Result<ChangeSet>
where
    C: ConfirmCallback + ?Sized,
{
    stepdiff::confirm_changes(changes, step_diff_message, confirm)
}
