//! Client configuration types.
//!
//! `ClientConfig` represents `config.toml` in the data directory. Every field
//! has a default so an empty or missing file yields a working configuration.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the session gateway (without the `/session` path).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Which reply payload the gateway expects.
    #[serde(default)]
    pub reply_format: ReplyFormat,

    /// Where rendered diagrams are written. Defaults to `{data_dir}/diagrams`.
    #[serde(default)]
    pub diagram_dir: Option<PathBuf>,

    /// Bearer token sent with every gateway request.
    #[serde(default)]
    pub api_token: Option<SecretString>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            reply_format: ReplyFormat::default(),
            diagram_dir: None,
            api_token: None,
        }
    }
}

/// Shape of the reply request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyFormat {
    /// `{ "answer": "..." }`
    #[default]
    Single,
    /// `{ "answers": [{ "question": "...", "answer": "..." }] }`
    Paired,
}
