//! Domain entities - The conversation and its turns

mod conversation;
mod turn;

pub use conversation::{Conversation, INSTRUCTION_FRAMING};
pub use turn::{ToolArguments, ToolInvocation, ToolResult, Turn};
