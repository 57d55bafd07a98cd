//! Queue of questions the gateway has issued but the user has not seen yet.

use std::collections::VecDeque;

use serde::Serialize;

/// Ordered buffer of pending questions.
///
/// Lets the controller serve already-known questions without a network
/// round-trip. A question leaves the buffer when it is surfaced into the
/// conversation log, so the two never hold the same question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnBuffer {
    questions: VecDeque<String>,
}

impl TurnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a question at the tail.
    pub fn push(&mut self, question: impl Into<String>) {
        self.questions.push_back(question.into());
    }

    /// Remove and return the head, or `None` if the buffer is empty.
    pub fn pop_head(&mut self) -> Option<String> {
        self.questions.pop_front()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }
}
