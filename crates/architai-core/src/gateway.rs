//! SessionGateway trait definition.
//!
//! The remote generation service is reached through this port. Implementations
//! live in architai-infra (e.g., `HttpSessionGateway`); tests use in-memory
//! fakes. Uses native async fn in traits (RPITIT, Rust 2024 edition).

use std::future::Future;
use std::sync::Arc;

use architai_types::design::FinalDesign;
use architai_types::error::GatewayError;
use architai_types::gateway::{
    CreateSessionRequest, CreateSessionResponse, ReplyRequest, ReplyResponse, SessionRecord,
};

/// Session lifecycle operations exposed by the remote generation service.
pub trait SessionGateway: Send + Sync {
    /// Create a session from the user's system idea.
    fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> impl Future<Output = Result<CreateSessionResponse, GatewayError>> + Send;

    /// List every persisted session, with embedded conversations.
    fn list_sessions(&self) -> impl Future<Output = Result<Vec<SessionRecord>, GatewayError>> + Send;

    /// Send the user's answer for a session.
    fn reply(
        &self,
        session_id: &str,
        request: &ReplyRequest,
    ) -> impl Future<Output = Result<ReplyResponse, GatewayError>> + Send;

    /// Produce the final design for a session.
    fn finalize(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<FinalDesign, GatewayError>> + Send;
}

impl<G: SessionGateway> SessionGateway for Arc<G> {
    fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> impl Future<Output = Result<CreateSessionResponse, GatewayError>> + Send {
        (**self).create_session(request)
    }

    fn list_sessions(&self) -> impl Future<Output = Result<Vec<SessionRecord>, GatewayError>> + Send {
        (**self).list_sessions()
    }

    fn reply(
        &self,
        session_id: &str,
        request: &ReplyRequest,
    ) -> impl Future<Output = Result<ReplyResponse, GatewayError>> + Send {
        (**self).reply(session_id, request)
    }

    fn finalize(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<FinalDesign, GatewayError>> + Send {
        (**self).finalize(session_id)
    }
}
