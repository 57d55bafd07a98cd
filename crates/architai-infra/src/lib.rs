//! Infrastructure layer for the ArchitAI client.
//!
//! Concrete implementations of the ports defined in `architai-core`: the
//! HTTP session gateway, the mermaid file renderer, config loading and data
//! directory resolution.

pub mod config;
pub mod diagram;
pub mod filesystem;
pub mod gateway;
