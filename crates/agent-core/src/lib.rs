//! # agent-core
//!
//! Core agent logic with provider-agnostic reasoning abstraction and an
//! extensible tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │  ReasoningProvider  │  │
//! │  │    Loop     │──│   Registry  │──│     (Strategy)      │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ReasoningProvider` trait enables swapping between hosted LLM
//! backends without changing agent logic. One turn alternates between
//! provider round-trips and local tool dispatch until a final answer is
//! produced; every failure inside a turn surfaces as a plain answer string.

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{Message, Role, Transcript};
pub use provider::{GenerationOptions, ModelResponse, ReasoningProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use session::{Session, SessionId, SessionStore};
pub use tool::{Tool, ToolInvocation, ToolRegistry, ToolResult, ToolSchema};
