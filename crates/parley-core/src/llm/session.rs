//! Stateful chat session over a stateless model.
//!
//! The model only ever sees whole conversations. `ChatSession` keeps the
//! running history so callers can talk to it turn by turn: seed it with
//! prior turns, then send one message at a time.

use parley_types::llm::{ChatContent, ContentRole, GenerateRequest, GenerateResponse, LlmError};
use tracing::debug;

use super::box_provider::BoxChatModel;

/// A conversation in progress against a [`BoxChatModel`].
pub struct ChatSession<'a> {
    model: &'a BoxChatModel,
    history: Vec<ChatContent>,
}

impl<'a> ChatSession<'a> {
    /// Start a session seeded with prior turns (oldest first).
    pub fn start(model: &'a BoxChatModel, history: Vec<ChatContent>) -> Self {
        Self { model, history }
    }

    /// Turns exchanged so far, including the seed.
    pub fn history(&self) -> &[ChatContent] {
        &self.history
    }

    /// Send a user message and wait for the model's reply.
    ///
    /// The request carries the full history followed by `text`. Only after
    /// a successful reply are the user turn and the model turn committed to
    /// the session history; on error the history is left as it was.
    pub async fn send_message(&mut self, text: &str) -> Result<GenerateResponse, LlmError> {
        let user_turn = ChatContent::text(ContentRole::User, text);

        let mut contents = Vec::with_capacity(self.history.len() + 1);
        contents.extend(self.history.iter().cloned());
        contents.push(user_turn.clone());
        let request = GenerateRequest { contents };

        debug!(
            provider = self.model.name(),
            turns = request.contents.len(),
            "Sending chat turn"
        );

        let response = self.model.generate(&request).await?;

        self.history.push(user_turn);
        self.history
            .push(ChatContent::text(ContentRole::Model, response.text.clone()));

        Ok(response)
    }
}
