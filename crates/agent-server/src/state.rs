//! Application State

use std::sync::Arc;

use agent_core::{session::MemorySessionStore, AgentConfig, ReasoningProvider, ToolRegistry};
use user_service::MemoryUserStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Reasoning provider (Mistral, etc.)
    pub provider: Arc<dyn ReasoningProvider>,

    /// Tool registry with all available tools
    pub tools: Arc<ToolRegistry>,

    /// Per-conversation chat sessions
    pub sessions: Arc<MemorySessionStore>,

    /// Registered users
    pub users: Arc<MemoryUserStore>,

    /// Base agent configuration (system prompt, step budget, generation)
    pub agent_config: AgentConfig,
}
