//! One conversational turn against the hosted assistant: thread resolution,
//! first-turn context seeding, bounded run polling or streaming, and cleanup.

pub mod cleanup;
pub mod driver;
pub mod error;
pub mod polling;
pub mod resolver;

pub use cleanup::{CleanupOutcome, CleanupService};
pub use driver::{ChatReply, ConversationDriver, ReplyStream, NO_RESPONSE};
pub use error::{ConversationError, Result};
pub use polling::{wait_for_run, PollConfig};
pub use resolver::ThreadResolver;
