pub mod types;
pub mod traits;
pub mod assistants;
pub mod streaming;
pub mod buffer_utils;
pub mod openai;
pub mod config;

#[cfg(feature = "testing")]
pub mod testing;

pub use traits::{
    ChatClient,
    AssistantClient,
    ChatRequest, ChatResponse, ChatOptions, ResponseFormat,
    TokenUsage, RunEventStream,
};

pub use assistants::{AssistantThread, ThreadMessage, MessageRole, Run, RunStatus, RunError, ListOrder};
pub use streaming::StreamEvent;
pub use buffer_utils::SseLineBuffer;
pub use openai::OpenAIClient;
pub use config::{OpenAIConfig, ClientFactory};
pub use types::{Message, Content};
