//! Live design session: controller, conversation log and turn buffer.

pub mod buffer;
pub mod controller;
pub mod log;
pub mod state;

pub use buffer::TurnBuffer;
pub use controller::{SessionController, TurnOutcome};
pub use log::{ConversationClosed, ConversationLog};
pub use state::SessionState;
