//! Live session controller.
//!
//! Drives the question/answer loop for one design session: creates the
//! session, serves answers from the turn buffer or the gateway, and runs the
//! finalize transition. Gateway calls are serialized per controller and
//! tagged, so a `reset()` while a call is pending makes its response a no-op.

use std::sync::{Mutex, MutexGuard};

use architai_types::config::ReplyFormat;
use architai_types::design::FinalDesign;
use architai_types::error::SessionError;
use architai_types::gateway::{AnsweredQuestion, CreateSessionRequest, ReplyRequest};
use architai_types::message::Message;
use architai_types::session::{Session, SessionStatus};
use chrono::Utc;
use tracing::{debug, info};

use super::buffer::TurnBuffer;
use super::log::ConversationLog;
use super::state::{CallTicket, SessionState};
use crate::gateway::SessionGateway;

/// What a successful `submit_answer` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The next question came from the turn buffer; no gateway call was made.
    Buffered { question: String },
    /// The gateway issued the next question.
    Asked { question: String },
    /// The gateway accepted the answer but has nothing new to ask yet.
    Waiting,
    /// The answer completed the session and the final design was produced.
    Finalized(FinalDesign),
}

impl TurnOutcome {
    /// The question surfaced by this turn, if any.
    pub fn question(&self) -> Option<&str> {
        match self {
            TurnOutcome::Buffered { question } | TurnOutcome::Asked { question } => Some(question),
            _ => None,
        }
    }
}

/// Guided-conversation state machine for one session at a time.
///
/// Generic over `SessionGateway` so the core never depends on a transport.
/// Methods take `&self`: the state lives behind a mutex that is never held
/// across an await, which lets `reset()` run while another call is pending.
pub struct SessionController<G: SessionGateway> {
    gateway: G,
    reply_format: ReplyFormat,
    state: Mutex<SessionState>,
}

impl<G: SessionGateway> SessionController<G> {
    /// Create a controller in its initial state.
    pub fn new(gateway: G, reply_format: ReplyFormat) -> Self {
        Self::with_state(gateway, reply_format, SessionState::default())
    }

    /// Create a controller around an existing state value.
    pub fn with_state(gateway: G, reply_format: ReplyFormat, state: SessionState) -> Self {
        Self {
            gateway,
            reply_format,
            state: Mutex::new(state),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    /// Start a session from the user's system idea.
    ///
    /// Returns the first question, if the gateway issued any.
    pub async fn start(&self, prompt: &str) -> Result<Option<String>, SessionError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }

        let ticket = {
            let mut state = self.state();
            if state.session.is_some() {
                return Err(SessionError::SessionAlreadyActive);
            }
            state.begin_call()?
        };

        let request = CreateSessionRequest {
            prompt: prompt.to_string(),
        };
        let result = self.gateway.create_session(&request).await;

        let mut state = self.state();
        claim(&mut state, &ticket)?;
        let response = result?;

        state.session = Some(Session {
            id: response.session_id,
            created_at: response.created_at.unwrap_or_else(Utc::now),
            status: SessionStatus::InProgress,
        });
        state.log = ConversationLog::new();
        state.buffer = TurnBuffer::new();
        state.clear_unsent();
        append(&mut state, Message::user(prompt))?;
        for question in response.questions.into_iter().filter(|q| !q.trim().is_empty()) {
            state.buffer.push(question);
        }

        let first = state.buffer.pop_head();
        if let Some(question) = &first {
            append(&mut state, Message::assistant(question.clone()))?;
        }

        info!(
            session_id = state.session_id().unwrap_or_default(),
            buffered = state.buffer.len(),
            "Design session started"
        );
        Ok(first)
    }

    /// Answer the current question.
    ///
    /// Buffered questions are served locally; only when the buffer is empty
    /// does the answer go to the gateway. Answers given to buffered questions
    /// are held back and sent along with it in the paired format. A
    /// `ready_to_finalize` response with nothing left to ask runs the
    /// finalize transition before returning.
    pub async fn submit_answer(&self, answer: &str) -> Result<TurnOutcome, SessionError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }

        let (ticket, session_id, request) = {
            let mut state = self.state();
            let (session_id, status) = match &state.session {
                Some(session) => (session.id.clone(), session.status),
                None => return Err(SessionError::NoActiveSession),
            };
            if status == SessionStatus::Finalized {
                return Err(SessionError::AlreadyFinalized);
            }
            if state.is_busy() {
                return Err(SessionError::RequestInFlight);
            }
            let pending = state.current_question().map(str::to_owned);
            if pending.is_none() && state.buffer.is_empty() {
                return Err(SessionError::NoPendingQuestion);
            }

            if let Some(question) = state.buffer.pop_head() {
                append(&mut state, Message::user(answer))?;
                append(&mut state, Message::assistant(question.clone()))?;
                if let Some(answered) = pending {
                    state.record_unsent(answered, answer.to_string());
                }
                debug!(session_id = %session_id, remaining = state.buffer.len(), "Served question from buffer");
                return Ok(TurnOutcome::Buffered { question });
            }

            let request =
                self.reply_request(state.unsent_answers(), pending.unwrap_or_default(), answer);
            (state.begin_call()?, session_id, request)
        };

        let result = self.gateway.reply(&session_id, &request).await;

        {
            let mut state = self.state();
            if !state.accepts(&ticket) {
                debug!(session_id = %session_id, "Discarding reply for a reset session");
                return Err(SessionError::Superseded);
            }
            let response = match result {
                Ok(response) => response,
                Err(err) => {
                    state.end_call();
                    return Err(err.into());
                }
            };

            append(&mut state, Message::user(answer))?;
            state.clear_unsent();
            state.last_reply = response.reply;

            let offered = response.next_questions.len();
            let fresh: Vec<String> = response
                .next_questions
                .into_iter()
                .filter(|q| !q.trim().is_empty() && !state.log.has_asked(q))
                .collect();
            if fresh.len() < offered {
                debug!(session_id = %session_id, dropped = offered - fresh.len(), "Ignoring questions already asked");
            }

            let mut questions = fresh.into_iter();
            if let Some(question) = questions.next() {
                for rest in questions {
                    state.buffer.push(rest);
                }
                append(&mut state, Message::assistant(question.clone()))?;
                state.set_status(SessionStatus::InProgress);
                state.end_call();
                return Ok(TurnOutcome::Asked { question });
            }

            if response.status != SessionStatus::ReadyToFinalize {
                state.set_status(SessionStatus::InProgress);
                state.end_call();
                return Ok(TurnOutcome::Waiting);
            }

            // The call stays marked in flight through the finalize request.
            state.set_status(SessionStatus::ReadyToFinalize);
        }

        self.run_finalize(ticket, session_id)
            .await
            .map(TurnOutcome::Finalized)
    }

    /// Request the final design explicitly.
    ///
    /// Allowed once nothing is awaiting an answer and the buffer is empty:
    /// after a failed automatic finalize, or for a session that was created
    /// without questions.
    pub async fn finalize(&self) -> Result<FinalDesign, SessionError> {
        let (ticket, session_id) = {
            let mut state = self.state();
            let (session_id, status) = match &state.session {
                Some(session) => (session.id.clone(), session.status),
                None => return Err(SessionError::NoActiveSession),
            };
            if status == SessionStatus::Finalized {
                return Err(SessionError::AlreadyFinalized);
            }
            if state.is_busy() {
                return Err(SessionError::RequestInFlight);
            }
            if state.current_question().is_some() || !state.buffer.is_empty() {
                return Err(SessionError::NotReadyToFinalize);
            }
            (state.begin_call()?, session_id)
        };

        self.run_finalize(ticket, session_id).await
    }

    /// Return to the initial state. Always succeeds.
    ///
    /// A call still in flight resolves into `SessionError::Superseded`
    /// without touching the cleared state.
    pub fn reset(&self) {
        let mut state = self.state();
        if let Some(id) = state.session_id() {
            debug!(session_id = %id, busy = state.is_busy(), "Resetting session");
        }
        state.reset();
    }

    async fn run_finalize(
        &self,
        ticket: CallTicket,
        session_id: String,
    ) -> Result<FinalDesign, SessionError> {
        let result = self.gateway.finalize(&session_id).await;

        let mut state = self.state();
        claim(&mut state, &ticket)?;
        let design = result?;

        append(&mut state, Message::final_design(design.diagram_url.clone()))?;
        state.final_design = Some(design.clone());
        state.set_status(SessionStatus::Finalized);

        info!(
            session_id = %session_id,
            components = design.components.len(),
            "Design session finalized"
        );
        Ok(design)
    }

    /// Build the reply body. The single format can only carry the latest
    /// answer; the paired one also carries every buffered answer not yet sent.
    fn reply_request(
        &self,
        unsent: &[AnsweredQuestion],
        question: String,
        answer: &str,
    ) -> ReplyRequest {
        match self.reply_format {
            ReplyFormat::Single => ReplyRequest::Single {
                answer: answer.to_string(),
            },
            ReplyFormat::Paired => {
                let mut answers = unsent.to_vec();
                answers.push(AnsweredQuestion {
                    question,
                    answer: answer.to_string(),
                });
                ReplyRequest::Paired { answers }
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Settle an in-flight call: reject stale tickets, otherwise clear the
/// in-flight mark so the response can be applied.
fn claim(state: &mut SessionState, ticket: &CallTicket) -> Result<(), SessionError> {
    if !state.accepts(ticket) {
        debug!("Discarding gateway response for a reset session");
        return Err(SessionError::Superseded);
    }
    state.end_call();
    Ok(())
}

fn append(state: &mut SessionState, message: Message) -> Result<(), SessionError> {
    state
        .log
        .append(message)
        .map_err(|_| SessionError::AlreadyFinalized)
}
