//! Append-only conversation log.

use architai_types::message::Message;
use serde::Serialize;
use thiserror::Error;

/// Returned when appending to a log that already ends with a final design.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("conversation already ended with a final design")]
pub struct ConversationClosed;

/// Ordered sequence of messages rendered to the user.
///
/// During a live session entries are only ever appended, and nothing may
/// follow a final-design message. History playback swaps the whole
/// transcript in one step with [`ConversationLog::replace_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end of the log.
    pub fn append(&mut self, message: Message) -> Result<(), ConversationClosed> {
        if self.is_closed() {
            return Err(ConversationClosed);
        }
        self.messages.push(message);
        Ok(())
    }

    /// Replace the whole transcript.
    ///
    /// Stored transcripts are taken as-is, so the final-design rule is not
    /// enforced here.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Whether the log ends with a final-design message.
    pub fn is_closed(&self) -> bool {
        self.messages.last().is_some_and(Message::is_final_design)
    }

    /// The question awaiting an answer: the text of the last message when
    /// that message is from the assistant.
    pub fn awaiting_answer(&self) -> Option<&str> {
        match self.messages.last() {
            Some(Message::Assistant { text }) => Some(text),
            _ => None,
        }
    }

    /// Whether `question` was already surfaced as an assistant message.
    pub fn has_asked(&self, question: &str) -> bool {
        let question = question.trim();
        self.messages.iter().any(|message| match message {
            Message::Assistant { text } => text.trim() == question,
            _ => false,
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
