mod chat;
mod index;
mod registry;

pub use chat::{build_prompt, ChatService};
pub use index::IndexService;
pub use registry::EngineRegistry;
