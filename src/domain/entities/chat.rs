use serde::{Deserialize, Serialize};

/// One human/assistant exchange. Turns are immutable once created and
/// chronological order matters; the client owns the full transcript and
/// resends it on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub human: String,
    pub assistant: String,
}

impl ChatTurn {
    pub fn new(human: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            assistant: assistant.into(),
        }
    }
}
