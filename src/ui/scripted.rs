use std::collections::VecDeque;

use crate::error::{ReleaseError, Result};
use crate::ui::{Decision, Operator};

/// One scripted operator answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Press Enter at a value prompt
    Accept,
    /// Type a value at a value prompt
    Value(String),
    Yes,
    No,
}

/// Operator that replays a fixed sequence of answers
///
/// Running out of answers is treated as the operator aborting.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    responses: VecDeque<Response>,
    transcript: Vec<String>,
}

impl ScriptedOperator {
    pub fn new(responses: impl IntoIterator<Item = Response>) -> Self {
        ScriptedOperator {
            responses: responses.into_iter().collect(),
            transcript: Vec::new(),
        }
    }

    /// Prompts shown so far, in order
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    fn next(&mut self, prompt: String) -> Result<Response> {
        self.transcript.push(prompt.clone());
        self.responses
            .pop_front()
            .ok_or_else(|| ReleaseError::cancelled(format!("no answer for '{}'", prompt)))
    }
}

impl Operator for ScriptedOperator {
    fn prompt(&mut self, label: &str, default: &str) -> Result<Decision> {
        match self.next(format!("{} [{}]", label, default))? {
            Response::Accept => Ok(Decision::AcceptDefault),
            Response::Value(value) => Ok(Decision::Override(value)),
            other => Err(ReleaseError::cancelled(format!(
                "expected a value for '{}', script has {:?}",
                label, other
            ))),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        match self.next(question.to_string())? {
            Response::Yes => Ok(true),
            Response::No => Ok(false),
            other => Err(ReleaseError::cancelled(format!(
                "expected yes/no for '{}', script has {:?}",
                question, other
            ))),
        }
    }
}
