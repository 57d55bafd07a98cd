use thiserror::Error;

/// Errors raised by a remote session gateway.
///
/// Every variant is a transport-class failure: the request did not produce a
/// usable response and the caller's state must stay untouched.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unreachable: {0}")]
    Transport(String),

    #[error("gateway returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("session '{0}' not found")]
    NotFound(String),

    #[error("failed to decode gateway response: {0}")]
    Deserialization(String),

    #[error("invalid gateway configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from session controller operations.
///
/// `Gateway` is the only transient variant; everything else is a
/// precondition violation rejected before any state change.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("answer must not be empty")]
    EmptyAnswer,

    #[error("a session is already active")]
    SessionAlreadyActive,

    #[error("no active session")]
    NoActiveSession,

    #[error("no question is awaiting an answer")]
    NoPendingQuestion,

    #[error("session is already finalized")]
    AlreadyFinalized,

    #[error("session is not ready to finalize")]
    NotReadyToFinalize,

    #[error("a gateway request is already in flight for this session")]
    RequestInFlight,

    #[error("session was reset while the request was in flight")]
    Superseded,
}

impl SessionError {
    /// Whether the error came from the gateway and the operation may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::Gateway(_))
    }

    /// Whether the caller broke the controller's contract.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, SessionError::Gateway(_) | SessionError::Superseded)
    }
}

/// Errors from a diagram renderer.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("diagram markup is empty")]
    EmptyMarkup,

    #[error("failed to write diagram: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while loading the client configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}
