//! Chat service: identity resolution, relay, and sequence management.
//!
//! ChatService ties a request's session identity to a stored user, assembles
//! the conversation for the model, relays the new message, and persists the
//! exchange. Nothing is written unless the model round-trip succeeds.

use parley_types::chat::Message;
use parley_types::error::ChatError;
use parley_types::user::{SessionIdentity, User, UserId};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::chat::history::assemble_turn;
use crate::chat::lock::UserLocks;
use crate::llm::box_provider::BoxChatModel;
use crate::llm::session::ChatSession;
use crate::repository::user::UserRepository;

/// Orchestrates conversation reads and writes for authenticated users.
///
/// Generic over `UserRepository` to keep parley-core free of storage
/// dependencies; the model is held type-erased so it can be swapped at
/// startup.
pub struct ChatService<R: UserRepository> {
    user_repo: R,
    model: BoxChatModel,
    locks: UserLocks,
}

impl<R: UserRepository> ChatService<R> {
    pub fn new(user_repo: R, model: BoxChatModel) -> Self {
        Self {
            user_repo,
            model,
            locks: UserLocks::new(),
        }
    }

    /// Access the user repository.
    pub fn user_repo(&self) -> &R {
        &self.user_repo
    }

    /// Access the chat model.
    pub fn model(&self) -> &BoxChatModel {
        &self.model
    }

    // --- Identity ---

    /// Look up the user named by the session identity.
    ///
    /// An identifier that does not parse, or that matches no user, is
    /// `Unauthorized`.
    pub async fn resolve_user(&self, identity: &SessionIdentity) -> Result<User, ChatError> {
        let user_id = parse_identity(identity)?;
        self.load_user(&user_id).await
    }

    /// Check that `user` is the one the session identity names.
    ///
    /// Ids are compared parsed, so any spelling `resolve_user` accepts is an
    /// owner here too. Always holds for a user obtained through
    /// [`Self::resolve_user`]; kept as an explicit check on read and clear.
    pub fn authorize_owner(user: &User, identity: &SessionIdentity) -> Result<(), ChatError> {
        if identity.user_id.parse::<UserId>().ok() != Some(user.id) {
            warn!(
                user_id = %user.id,
                claimed = %identity.user_id,
                "Session identity does not own the resolved user"
            );
            return Err(ChatError::PermissionMismatch);
        }
        Ok(())
    }

    async fn load_user(&self, user_id: &UserId) -> Result<User, ChatError> {
        match self.user_repo.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = %user_id, "No user for session identity");
                Err(ChatError::Unauthorized)
            }
        }
    }

    // --- Relay ---

    /// Send a message on behalf of the session's user and store the exchange.
    ///
    /// The model is seeded with the user's whole prior conversation and sent
    /// `text` as the new turn. On success the user message and the reply are
    /// appended together and the full updated conversation is returned.
    pub async fn send_message(
        &self,
        identity: &SessionIdentity,
        text: &str,
    ) -> Result<Vec<Message>, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::Validation("Message is required".to_string()));
        }

        let user_id = parse_identity(identity)?;
        let _guard = self.locks.lock(user_id).await;
        let user = self.load_user(&user_id).await?;

        let turn = assemble_turn(&user.chats, text);
        let mut session = ChatSession::start(&self.model, turn.history);

        let span = info_span!(
            "gen_ai.chat",
            gen_ai.system = self.model.name(),
            gen_ai.request.model = self.model.model(),
            gen_ai.history.turns = session.history().len(),
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
        );

        let response = session
            .send_message(&turn.pending.content)
            .instrument(span.clone())
            .await
            .inspect_err(|e| warn!(user_id = %user_id, error = %e, "Model relay failed"))?;

        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);
        if let Some(reason) = &response.finish_reason {
            span.record("gen_ai.response.finish_reasons", reason.as_str());
        }

        let reply = Message::assistant(response.text);
        self.user_repo
            .append_messages(&user.id, &[turn.pending.clone(), reply.clone()])
            .await?;

        let mut chats = turn.working;
        chats.push(reply);

        info!(user_id = %user.id, messages = chats.len(), "Chat turn stored");
        Ok(chats)
    }

    // --- Sequence management ---

    /// Return the user's full conversation verbatim.
    pub async fn list_messages(&self, identity: &SessionIdentity) -> Result<Vec<Message>, ChatError> {
        let user = self.resolve_user(identity).await?;
        Self::authorize_owner(&user, identity)?;
        Ok(user.chats)
    }

    /// Reset the user's conversation to empty. Idempotent.
    pub async fn clear_messages(&self, identity: &SessionIdentity) -> Result<(), ChatError> {
        let user_id = parse_identity(identity)?;
        let _guard = self.locks.lock(user_id).await;
        let user = self.load_user(&user_id).await?;
        Self::authorize_owner(&user, identity)?;

        self.user_repo.clear_messages(&user.id).await?;
        info!(user_id = %user.id, cleared = user.chats.len(), "Conversation cleared");
        Ok(())
    }
}

fn parse_identity(identity: &SessionIdentity) -> Result<UserId, ChatError> {
    identity.user_id.parse().map_err(|_| {
        debug!(claimed = %identity.user_id, "Session identity is not a user id");
        ChatError::Unauthorized
    })
}
