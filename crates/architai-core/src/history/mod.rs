//! Read-only access to past sessions.

pub mod reconstructor;

pub use reconstructor::{HistoryReconstructor, SessionListing, SessionSummary, reconstruct_conversation};
