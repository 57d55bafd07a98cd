//! Explicit state owned by a session controller.
//!
//! Everything the live flow knows -- session identity, the conversation log,
//! the turn buffer, the final design and the in-flight bookkeeping -- sits in
//! one `SessionState` value so it can be injected, inspected and cleared as a
//! unit.

use architai_types::design::FinalDesign;
use architai_types::error::SessionError;
use architai_types::gateway::AnsweredQuestion;
use architai_types::session::{Session, SessionStatus};

use super::buffer::TurnBuffer;
use super::log::ConversationLog;

/// Tag attached to an in-flight gateway call.
///
/// A response is applied only if the state still carries the same epoch and
/// session id as when the call was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallTicket {
    epoch: u64,
    session_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub session: Option<Session>,
    pub log: ConversationLog,
    pub buffer: TurnBuffer,
    pub final_design: Option<FinalDesign>,
    /// Commentary the gateway attached to its last reply.
    pub last_reply: Option<String>,
    /// Answers served from the turn buffer that the gateway has not seen.
    unsent: Vec<AnsweredQuestion>,
    in_flight: bool,
    epoch: u64,
}

impl SessionState {
    pub fn status(&self) -> Option<SessionStatus> {
        self.session.as_ref().map(|s| s.status)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    /// The question the user is expected to answer next.
    pub fn current_question(&self) -> Option<&str> {
        self.log.awaiting_answer()
    }

    pub fn is_finalized(&self) -> bool {
        self.status() == Some(SessionStatus::Finalized)
    }

    /// Whether a gateway call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Return to the initial state.
    ///
    /// The epoch moves forward so responses to calls issued before the reset
    /// are recognized as stale.
    pub fn reset(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = SessionState {
            epoch,
            ..SessionState::default()
        };
    }

    /// Buffered answers waiting to ride along with the next gateway reply.
    pub fn unsent_answers(&self) -> &[AnsweredQuestion] {
        &self.unsent
    }

    pub(crate) fn record_unsent(&mut self, question: String, answer: String) {
        self.unsent.push(AnsweredQuestion { question, answer });
    }

    pub(crate) fn clear_unsent(&mut self) {
        self.unsent.clear();
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        if let Some(session) = self.session.as_mut() {
            session.status = status;
        }
    }

    /// Mark a gateway call as outstanding and hand out its ticket.
    pub(crate) fn begin_call(&mut self) -> Result<CallTicket, SessionError> {
        if self.in_flight {
            return Err(SessionError::RequestInFlight);
        }
        self.in_flight = true;
        Ok(CallTicket {
            epoch: self.epoch,
            session_id: self.session_id().map(str::to_owned),
        })
    }

    /// Whether a response carrying `ticket` still belongs to this state.
    pub(crate) fn accepts(&self, ticket: &CallTicket) -> bool {
        self.in_flight
            && ticket.epoch == self.epoch
            && ticket.session_id.as_deref() == self.session_id()
    }

    pub(crate) fn end_call(&mut self) {
        self.in_flight = false;
    }
}
