//! History assembly: stored messages to model-facing content.
//!
//! Stored messages use the `user`/`assistant` vocabulary; the model expects
//! `user`/`model` turns made of text parts. The whole prior conversation is
//! replayed on every turn. There is no truncation.

use parley_types::chat::{Message, MessageRole};
use parley_types::llm::{ChatContent, ContentRole};

/// Everything needed to run one turn of a conversation.
#[derive(Debug, Clone)]
pub struct AssembledTurn {
    /// Prior messages with the new user message appended.
    pub working: Vec<Message>,
    /// Prior messages in the model's format, used to seed the session.
    /// Does not include the new message.
    pub history: Vec<ChatContent>,
    /// The new user message, sent separately from `history`.
    pub pending: Message,
}

/// Map a stored role to the model's role vocabulary.
pub fn to_content_role(role: MessageRole) -> ContentRole {
    match role {
        MessageRole::User => ContentRole::User,
        MessageRole::Assistant => ContentRole::Model,
    }
}

/// Convert one stored message to a single-part content turn.
pub fn to_content(message: &Message) -> ChatContent {
    ChatContent::text(to_content_role(message.role), message.content.clone())
}

/// Build the working sequence and model history for a new user message.
pub fn assemble_turn(prior: &[Message], text: &str) -> AssembledTurn {
    let pending = Message::user(text);

    let history = prior.iter().map(to_content).collect();

    let mut working = Vec::with_capacity(prior.len() + 1);
    working.extend_from_slice(prior);
    working.push(pending.clone());

    AssembledTurn {
        working,
        history,
        pending,
    }
}
