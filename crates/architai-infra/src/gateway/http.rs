//! HttpSessionGateway -- concrete [`SessionGateway`] over the service's REST API.
//!
//! Routes (relative to the configured base URL):
//!
//! | Operation | Route |
//! |---|---|
//! | create session | `POST /session/` |
//! | list sessions | `GET /session/` |
//! | reply | `POST /session/{id}/reply` |
//! | finalize | `POST /session/{id}/finalize` |
//!
//! The optional bearer token is wrapped in [`secrecy::SecretString`] and is
//! only exposed when building the `Authorization` header.

use std::time::Duration;

use reqwest::{RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use architai_core::gateway::SessionGateway;
use architai_types::config::ClientConfig;
use architai_types::design::FinalDesign;
use architai_types::error::GatewayError;
use architai_types::gateway::{
    CreateSessionRequest, CreateSessionResponse, ReplyRequest, ReplyResponse, SessionRecord,
};

/// Longest error body kept in a `GatewayError::Status` message.
const MAX_ERROR_BODY: usize = 512;

/// Session gateway backed by the generation service's HTTP API.
///
/// Does not derive Debug so the token never ends up in logs.
#[derive(Clone)]
pub struct HttpSessionGateway {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
}

impl HttpSessionGateway {
    /// Build a gateway from the client configuration.
    ///
    /// A `timeout_secs` of zero disables the request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            GatewayError::InvalidConfig(format!("invalid base_url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidConfig(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::InvalidConfig(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL.
    ///
    /// Segments are percent-encoded, so a session id can never escape its
    /// position in the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::InvalidConfig(format!("base_url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a JSON response.
    ///
    /// `session_id` turns a 404 into [`GatewayError::NotFound`].
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session_id: Option<&str>,
    ) -> Result<T, GatewayError> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Transport(format!("request timed out: {e}"))
            } else {
                GatewayError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Gateway responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match (status.as_u16(), session_id) {
                (404, Some(id)) => GatewayError::NotFound(id.to_string()),
                (code, _) => GatewayError::Status {
                    status: code,
                    message: error_message(&body),
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Deserialization(e.to_string()))
    }
}

/// Pull a readable message out of an error body.
///
/// The service reports errors as `{"detail": "..."}`; anything else is passed
/// through, truncated.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(text)) => return text.clone(),
            Some(detail) => return detail.to_string(),
            None => {}
        }
    }

    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

impl SessionGateway for HttpSessionGateway {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreateSessionResponse, GatewayError> {
        let url = self.endpoint(&["session", ""])?;
        debug!(%url, "Creating session");
        self.send(self.client.post(url).json(request), None).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, GatewayError> {
        let url = self.endpoint(&["session", ""])?;
        debug!(%url, "Listing sessions");
        self.send(self.client.get(url), None).await
    }

    async fn reply(
        &self,
        session_id: &str,
        request: &ReplyRequest,
    ) -> Result<ReplyResponse, GatewayError> {
        let url = self.endpoint(&["session", session_id, "reply"])?;
        debug!(%url, "Sending reply");
        self.send(self.client.post(url).json(request), Some(session_id))
            .await
    }

    async fn finalize(&self, session_id: &str) -> Result<FinalDesign, GatewayError> {
        let url = self.endpoint(&["session", session_id, "finalize"])?;
        debug!(%url, "Requesting final design");
        self.send(self.client.post(url), Some(session_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architai_types::gateway::AnsweredQuestion;
    use architai_types::session::SessionStatus;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    // ---------------------------------------------------------------
    // In-process service
    // ---------------------------------------------------------------

    async fn create(Json(body): Json<Value>) -> Json<Value> {
        // Echo the prompt back as the first question so tests can see the body.
        let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
        Json(json!({
            "session_id": "3f2a9c41-7d7e-4c51-9f7a-0b8c1d2e3f40",
            "questions": [prompt, "What is the expected scale?"],
            "created_at": "2025-03-01T10:15:00.123456"
        }))
    }

    async fn list() -> Json<Value> {
        Json(json!([
            {
                "session_id": "s-1",
                "questions": ["Q1"],
                "created_at": "2025-03-01T10:15:00",
                "conversation": [
                    { "role": "user", "text": "idea" },
                    { "role": "ArchiTai", "text": "Q1" }
                ]
            },
            { "session_id": "s-2", "questions": null, "created_at": null }
        ]))
    }

    async fn reply(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
        if id == "missing" {
            return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Session not found" })))
                .into_response();
        }
        Json(json!({
            "next_questions": [format!("{id}:{body}")],
            "status": "in_progress",
            "reply": "Thanks"
        }))
        .into_response()
    }

    async fn finalize(Path(id): Path<String>) -> Response {
        match id.as_str() {
            "early" => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Not all questions answered yet" })),
            )
                .into_response(),
            "garbled" => (StatusCode::OK, "not json").into_response(),
            _ => Json(json!({
                "summary": "Chat platform",
                "components": [{ "name": "API", "desc": "REST edge" }],
                "mermaid": "graph TD\nA-->B",
                "tech_stack": null,
                "diagram_url": "https://diagrams.example/s.png"
            }))
            .into_response(),
        }
    }

    async fn guarded(headers: HeaderMap) -> Response {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bearer secret-token") => Json(json!([])).into_response(),
            _ => (StatusCode::UNAUTHORIZED, "missing token").into_response(),
        }
    }

    fn service() -> Router {
        Router::new()
            .route("/session/", post(create).get(list))
            .route("/session/{id}/reply", post(reply))
            .route("/session/{id}/finalize", post(finalize))
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// The request body the `reply` handler echoed into its first question.
    fn echoed_body(response: &ReplyResponse) -> Value {
        let (id, body) = response.next_questions[0].split_once(':').unwrap();
        assert_eq!(id, "s-1");
        serde_json::from_str(body).unwrap()
    }

    fn gateway(base_url: &str) -> HttpSessionGateway {
        HttpSessionGateway::new(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    // ---------------------------------------------------------------
    // Tests
    // ---------------------------------------------------------------

    #[test]
    fn test_endpoint_joins_segments() {
        let gw = gateway("http://localhost:8000/api/");
        assert_eq!(
            gw.endpoint(&["session", ""]).unwrap().as_str(),
            "http://localhost:8000/api/session/"
        );
        assert_eq!(
            gw.endpoint(&["session", "a/b", "reply"]).unwrap().as_str(),
            "http://localhost:8000/api/session/a%2Fb/reply"
        );
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let result = HttpSessionGateway::new(&ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(result, Err(GatewayError::InvalidConfig(_))));
    }

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(error_message(r#"{"detail":"Session not found"}"#), "Session not found");
        assert_eq!(error_message("  plain failure \n"), "plain failure");
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        assert!(error_message(&long).ends_with("..."));
    }

    #[tokio::test]
    async fn test_create_session_round_trip() {
        let base = serve(service()).await;
        let gw = gateway(&base);

        let response = gw
            .create_session(&CreateSessionRequest {
                prompt: "Build a chat app".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.session_id, "3f2a9c41-7d7e-4c51-9f7a-0b8c1d2e3f40");
        assert_eq!(response.questions[0], "Build a chat app");
        assert!(response.created_at.is_some());
    }

    #[tokio::test]
    async fn test_list_sessions_tolerates_nulls() {
        let base = serve(service()).await;
        let records = gateway(&base).list_sessions().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].conversation.len(), 2);
        assert_eq!(records[0].conversation[1].role.as_deref(), Some("ArchiTai"));
        assert!(records[1].questions.is_empty());
        assert!(records[1].conversation.is_empty());
    }

    #[tokio::test]
    async fn test_reply_sends_both_payload_shapes() {
        let base = serve(service()).await;
        let gw = gateway(&base);

        let single = gw
            .reply(
                "s-1",
                &ReplyRequest::Single {
                    answer: "10k users".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(single.status, SessionStatus::InProgress);
        assert_eq!(single.reply.as_deref(), Some("Thanks"));
        assert_eq!(echoed_body(&single), json!({ "answer": "10k users" }));

        let paired = gw
            .reply(
                "s-1",
                &ReplyRequest::Paired {
                    answers: vec![AnsweredQuestion {
                        question: "Scale?".to_string(),
                        answer: "10k".to_string(),
                    }],
                },
            )
            .await
            .unwrap();
        assert_eq!(
            echoed_body(&paired),
            json!({ "answers": [{ "question": "Scale?", "answer": "10k" }] })
        );
    }

    #[tokio::test]
    async fn test_reply_unknown_session_is_not_found() {
        let base = serve(service()).await;
        let err = gateway(&base)
            .reply(
                "missing",
                &ReplyRequest::Single {
                    answer: "x".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_finalize_decodes_design_and_maps_errors() {
        let base = serve(service()).await;
        let gw = gateway(&base);

        let design = gw.finalize("s-1").await.unwrap();
        assert_eq!(design.summary, "Chat platform");
        assert_eq!(design.components[0].description, "REST edge");
        assert!(design.tech_stack.is_empty());

        let err = gw.finalize("early").await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Status { status: 400, ref message } if message == "Not all questions answered yet"
        ));

        let err = gw.finalize("garbled").await.unwrap_err();
        assert!(matches!(err, GatewayError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let base = serve(Router::new().route("/session/", get(guarded))).await;

        let anonymous = gateway(&base).list_sessions().await.unwrap_err();
        assert!(matches!(anonymous, GatewayError::Status { status: 401, .. }));

        let authed = HttpSessionGateway::new(&ClientConfig {
            base_url: base.clone(),
            api_token: Some(SecretString::from("secret-token".to_string())),
            ..ClientConfig::default()
        })
        .unwrap();
        assert!(authed.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(&format!("http://{addr}"))
            .list_sessions()
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
