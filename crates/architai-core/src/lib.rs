//! Business logic and gateway trait definitions for the ArchitAI client.
//!
//! This crate defines the `SessionGateway` port that the infrastructure layer
//! implements, the live session controller, and the history reconstructor.
//! It depends only on `architai-types` -- never on `architai-infra` or any
//! network/IO crate.

pub mod diagram;
pub mod gateway;
pub mod history;
pub mod session;
