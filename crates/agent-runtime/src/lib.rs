//! # agent-runtime
//!
//! Runtime providers for the FinPal agent system.
//!
//! ## Providers
//!
//! - **Mistral** (default): hosted Mistral chat API with native function
//!   calling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::mistral::MistralProvider;
//!
//! let provider = MistralProvider::from_env()?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "mistral")]
pub mod mistral;

#[cfg(feature = "mistral")]
pub use mistral::MistralProvider;

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, Message, ReasoningProvider, Result, Role, Session, Tool, ToolRegistry,
    Transcript,
};
