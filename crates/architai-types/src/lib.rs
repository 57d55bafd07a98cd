//! Shared domain types for the ArchitAI client.
//!
//! This crate contains the types exchanged between the session controller,
//! the history reconstructor and the remote session gateway: messages,
//! sessions, final designs, wire payloads, configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror, secrecy.

pub mod config;
pub mod design;
pub mod error;
pub mod gateway;
pub mod message;
pub mod session;
mod timestamp;
