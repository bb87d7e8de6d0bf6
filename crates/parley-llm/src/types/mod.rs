pub(crate) mod content;
mod message;
mod prompt;
mod response;
mod stream;
mod tool;

pub use content::{ContentKind, ContentPart, Direction};
pub use message::{Message, Role};
pub use prompt::Prompt;
pub use response::{Choice, FinishReason, Response, Usage};
pub use stream::{Delta, StreamEvent};
pub use tool::{ToolCall, ToolExecutor, ToolSpec};
