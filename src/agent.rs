//! Per-chat conversational agents
//!
//! Every chat talks to the intent service through its own session so the
//! service can keep conversational context. Agents are created lazily on
//! the first message of a chat and live until the process exits.

use crate::http_utils::TransportError;
use crate::intent::{IntentService, RawIntent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Fixed parameters shared by every agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Language the intent service should classify in
    pub language_code: String,
}

/// Session bound to one chat
pub struct Agent {
    chat_id: i64,
    session_id: String,
    language_code: String,
    service: Arc<dyn IntentService>,
}

impl Agent {
    /// Open a fresh session for `chat_id`
    #[must_use]
    pub fn new(chat_id: i64, config: &AgentConfig, service: Arc<dyn IntentService>) -> Self {
        Self {
            chat_id,
            session_id: Uuid::new_v4().to_string(),
            language_code: config.language_code.clone(),
            service,
        }
    }

    /// Chat this agent belongs to
    #[must_use]
    pub const fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Session identifier sent to the intent service
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Classify `text` within this chat's session.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the intent service cannot be reached.
    pub async fn detect_intent(&self, text: &str) -> Result<RawIntent, TransportError> {
        self.service
            .detect_intent(&self.session_id, text, &self.language_code)
            .await
    }
}

/// Chat id to agent store with lookup-or-create semantics
///
/// No eviction: every chat that ever wrote to the bot keeps its agent.
pub struct AgentRegistry {
    agents: RwLock<HashMap<i64, Arc<Agent>>>,
    config: AgentConfig,
    service: Arc<dyn IntentService>,
}

impl AgentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(config: AgentConfig, service: Arc<dyn IntentService>) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            config,
            service,
        }
    }

    /// Get the chat's agent, creating it on first use.
    ///
    /// Concurrent callers for the same new chat id all receive the handle
    /// created by whichever of them takes the write lock first.
    pub async fn get(&self, chat_id: i64) -> Arc<Agent> {
        {
            let agents = self.agents.read().await;
            if let Some(agent) = agents.get(&chat_id) {
                return agent.clone();
            }
        }

        let mut agents = self.agents.write().await;
        agents
            .entry(chat_id)
            .or_insert_with(|| {
                let agent = Agent::new(chat_id, &self.config, self.service.clone());
                info!(chat_id, session_id = agent.session_id(), "Created agent for chat");
                Arc::new(agent)
            })
            .clone()
    }

    /// Check if the chat already has an agent
    pub async fn contains(&self, chat_id: i64) -> bool {
        self.agents.read().await.contains_key(&chat_id)
    }

    /// Number of chats with an agent
    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    /// Check if no chat has an agent yet
    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}
