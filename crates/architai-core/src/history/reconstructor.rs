//! History reconstructor.
//!
//! Fetches the bulk session listing once and rebuilds a displayable
//! conversation log for any session in it. Stored transcripts come from a
//! service that has spelled roles several ways; they are normalized into the
//! closed [`MessageRole`] set and anything unrecognized is treated as user text.

use std::vec;

use architai_types::error::GatewayError;
use architai_types::gateway::{SessionRecord, StoredMessage};
use architai_types::message::{Message, MessageRole};
use architai_types::session::short_id;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::gateway::SessionGateway;
use crate::session::ConversationLog;

/// One row of the history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    /// First stored question, or a short fragment of the id.
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub message_count: usize,
}

impl SessionSummary {
    fn from_record(record: &SessionRecord) -> Self {
        let title = record
            .questions
            .iter()
            .map(|q| q.trim())
            .find(|q| !q.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| short_id(&record.session_id).to_string());

        Self {
            session_id: record.session_id.clone(),
            title,
            created_at: record.created_at,
            message_count: record.conversation.len(),
        }
    }
}

/// Result of a listing call.
///
/// A one-shot iterator over the summaries as the gateway reported them at
/// call time. List again for a fresh view.
#[derive(Debug)]
pub struct SessionListing {
    inner: vec::IntoIter<SessionSummary>,
}

impl Iterator for SessionListing {
    type Item = SessionSummary;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SessionListing {}

/// Rebuilds past conversations from the gateway's session listing.
///
/// Owns its own conversation log, independent of any live controller.
pub struct HistoryReconstructor<G: SessionGateway> {
    gateway: G,
    records: Vec<SessionRecord>,
    log: ConversationLog,
}

impl<G: SessionGateway> HistoryReconstructor<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            records: Vec::new(),
            log: ConversationLog::new(),
        }
    }

    /// Fetch the full listing and derive a title for each record.
    ///
    /// On failure the previously fetched records are kept.
    pub async fn list_sessions(&mut self) -> Result<SessionListing, GatewayError> {
        let records = self.gateway.list_sessions().await?;
        debug!(count = records.len(), "Fetched session listing");
        self.records = records;

        let summaries: Vec<_> = self.records.iter().map(SessionSummary::from_record).collect();
        Ok(SessionListing {
            inner: summaries.into_iter(),
        })
    }

    /// Load a session's stored transcript into the reconstructor's log.
    ///
    /// Works on the already-fetched listing; no gateway call is made. An id
    /// that is not in the listing yields an empty log.
    pub fn select_session(&mut self, session_id: &str) -> &ConversationLog {
        let messages = match self.record(session_id) {
            Some(record) => reconstruct_conversation(&record.conversation),
            None => {
                debug!(session_id, "Session not in listing");
                Vec::new()
            }
        };
        self.log.replace_all(messages);
        &self.log
    }

    /// The raw record for a session in the last listing.
    pub fn record(&self, session_id: &str) -> Option<&SessionRecord> {
        self.records.iter().find(|r| r.session_id == session_id)
    }

    /// Resolve a full id or an unambiguous id prefix against the listing.
    pub fn resolve_id(&self, id_or_prefix: &str) -> Option<&str> {
        if let Some(record) = self.record(id_or_prefix) {
            return Some(&record.session_id);
        }
        let mut matches = self
            .records
            .iter()
            .filter(|r| r.session_id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) if !id_or_prefix.is_empty() => Some(&only.session_id),
            _ => None,
        }
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }
}

/// Map stored conversation entries to messages.
///
/// Roles are matched case-insensitively; a missing or unknown role becomes
/// [`MessageRole::User`].
pub fn reconstruct_conversation(stored: &[StoredMessage]) -> Vec<Message> {
    stored.iter().map(reconstruct_message).collect()
}

fn reconstruct_message(entry: &StoredMessage) -> Message {
    let role = match entry.role.as_deref() {
        Some(raw) => raw.parse::<MessageRole>().unwrap_or_else(|_| {
            warn!(role = raw, "Unrecognized stored role, treating as user");
            MessageRole::User
        }),
        None => MessageRole::User,
    };
    let text = entry.text.clone().unwrap_or_default();

    match role {
        MessageRole::User => Message::user(text),
        MessageRole::Assistant => Message::assistant(text),
        MessageRole::FinalDesign => Message::final_design(entry.diagram_url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use architai_types::design::FinalDesign;
    use architai_types::gateway::{
        CreateSessionRequest, CreateSessionResponse, ReplyRequest, ReplyResponse,
    };

    /// Gateway that only answers listings, from a scripted queue.
    #[derive(Default)]
    struct ListingGateway {
        listings: Mutex<Vec<Result<Vec<SessionRecord>, GatewayError>>>,
        list_calls: AtomicUsize,
    }

    impl ListingGateway {
        fn new(mut listings: Vec<Result<Vec<SessionRecord>, GatewayError>>) -> Self {
            listings.reverse();
            Self {
                listings: Mutex::new(listings),
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    impl SessionGateway for ListingGateway {
        fn create_session(
            &self,
            _request: &CreateSessionRequest,
        ) -> impl Future<Output = Result<CreateSessionResponse, GatewayError>> + Send {
            async { Err(GatewayError::Transport("not scripted".into())) }
        }

        fn list_sessions(
            &self,
        ) -> impl Future<Output = Result<Vec<SessionRecord>, GatewayError>> + Send {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let result = self
                .listings
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(Vec::new()));
            async move { result }
        }

        fn reply(
            &self,
            _session_id: &str,
            _request: &ReplyRequest,
        ) -> impl Future<Output = Result<ReplyResponse, GatewayError>> + Send {
            async { Err(GatewayError::Transport("not scripted".into())) }
        }

        fn finalize(
            &self,
            _session_id: &str,
        ) -> impl Future<Output = Result<FinalDesign, GatewayError>> + Send {
            async { Err(GatewayError::Transport("not scripted".into())) }
        }
    }

    fn stored(role: Option<&str>, text: &str) -> StoredMessage {
        StoredMessage {
            role: role.map(str::to_owned),
            text: Some(text.to_string()),
            diagram_url: None,
        }
    }

    fn record(id: &str, questions: &[&str], conversation: Vec<StoredMessage>) -> SessionRecord {
        SessionRecord {
            session_id: id.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
            created_at: None,
            conversation,
        }
    }

    #[test]
    fn test_service_name_maps_to_assistant() {
        let messages = reconstruct_conversation(&[stored(Some("ArchiTai"), "Q?")]);
        assert_eq!(messages, vec![Message::assistant("Q?")]);
    }

    #[test]
    fn test_unknown_or_missing_role_defaults_to_user() {
        let messages = reconstruct_conversation(&[
            stored(Some("system"), "hello"),
            stored(None, "no role"),
            stored(Some("USER"), "shouting"),
        ]);
        assert_eq!(
            messages,
            vec![
                Message::user("hello"),
                Message::user("no role"),
                Message::user("shouting"),
            ]
        );
    }

    #[test]
    fn test_final_design_entry_keeps_diagram_url() {
        let entry = StoredMessage {
            role: Some("finalDesign".to_string()),
            text: None,
            diagram_url: Some("https://diagrams.example/a.png".to_string()),
        };
        let messages = reconstruct_conversation(&[entry]);
        assert_eq!(
            messages,
            vec![Message::final_design(Some(
                "https://diagrams.example/a.png".to_string()
            ))]
        );
    }

    #[tokio::test]
    async fn test_list_sessions_derives_titles() {
        let gateway = ListingGateway::new(vec![Ok(vec![
            record("3f2a9c41-aaaa-bbbb", &["  ", "What scale?"], vec![]),
            record("77d0e512-cccc-dddd", &[], vec![stored(Some("user"), "idea")]),
        ])]);
        let mut history = HistoryReconstructor::new(gateway);

        let listing = history.list_sessions().await.unwrap();
        assert_eq!(listing.len(), 2);

        let summaries: Vec<_> = listing.collect();
        assert_eq!(summaries[0].title, "What scale?");
        assert_eq!(summaries[1].title, "77d0e512");
        assert_eq!(summaries[1].message_count, 1);
    }

    #[tokio::test]
    async fn test_select_session_replaces_log() {
        let gateway = ListingGateway::new(vec![Ok(vec![
            record(
                "s-1",
                &["Q1"],
                vec![stored(Some("user"), "idea"), stored(Some("architai"), "Q1")],
            ),
            record("s-2", &[], vec![stored(Some("user"), "other idea")]),
        ])]);
        let mut history = HistoryReconstructor::new(gateway);
        history.list_sessions().await.unwrap();

        let log = history.select_session("s-1");
        assert_eq!(log.messages(), &[Message::user("idea"), Message::assistant("Q1")]);

        let log = history.select_session("s-2");
        assert_eq!(log.messages(), &[Message::user("other idea")]);

        assert!(history.select_session("missing").is_empty());
        assert_eq!(history.gateway.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_listing_keeps_previous_records() {
        let gateway = ListingGateway::new(vec![
            Ok(vec![record("s-1", &["Q1"], vec![stored(None, "idea")])]),
            Err(GatewayError::Transport("connection reset".into())),
        ]);
        let mut history = HistoryReconstructor::new(gateway);
        history.list_sessions().await.unwrap();

        assert!(history.list_sessions().await.is_err());
        assert_eq!(history.records().len(), 1);
        assert_eq!(history.select_session("s-1").len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_id_accepts_unique_prefix() {
        let gateway = ListingGateway::new(vec![Ok(vec![
            record("3f2a9c41-1", &[], vec![]),
            record("3f2a9c41-2", &[], vec![]),
            record("77d0e512-1", &[], vec![]),
        ])]);
        let mut history = HistoryReconstructor::new(gateway);
        history.list_sessions().await.unwrap();

        assert_eq!(history.resolve_id("77d0"), Some("77d0e512-1"));
        assert_eq!(history.resolve_id("3f2a9c41-2"), Some("3f2a9c41-2"));
        assert_eq!(history.resolve_id("3f2a"), None);
        assert_eq!(history.resolve_id(""), None);
    }
}
