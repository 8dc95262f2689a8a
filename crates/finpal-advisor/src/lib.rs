//! # finpal-advisor
//!
//! Deterministic financial-planning tools for the FinPal agent.
//!
//! Two calculations back the assistant:
//!
//! - **SIP growth** - future value of a fixed monthly investment under
//!   monthly compounding (annuity-due closed form, zero-rate summation
//!   special case).
//! - **Currency conversion** - a simplified static rate table of direct
//!   pairs. No inverse fallback, no multi-hop routing; a missing pair is a
//!   typed failure the agent surfaces verbatim.
//!
//! Both are pure functions wrapped as `agent_core::Tool` implementations;
//! the pure math lives in [`growth`] and [`rates`] and is unit-tested
//! independently of the tool layer.

pub mod error;
pub mod growth;
pub mod rates;
pub mod svckit;

pub use error::{AdvisorError, Result};
pub use growth::sip_future_value;
pub use rates::convert;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CurrencyConverterTool, SipCalculatorTool};
}

/// System prompt for the FinPal financial assistant
pub const FINPAL_SYSTEM_PROMPT: &str = "You are a helpful financial assistant named FinPal Advisor. \
Your main task is to assist users with financial calculations using available tools, and answer \
general financial questions. When a calculation is requested and you have the necessary \
information, use the appropriate tool. If a query requires multiple steps (e.g., currency \
conversion then investment calculation), process them sequentially using the correct tools. If \
you need more information to perform a calculation, ask clarifying questions. If the query is a \
general financial question, answer it directly. Always provide a clear, concise, and helpful \
final answer to the user's original question.";
