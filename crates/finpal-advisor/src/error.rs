//! Error Types for the FinPal Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Exchange rate not available for {from} to {to}")]
    RateUnavailable { from: String, to: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<AdvisorError> for agent_core::AgentError {
    fn from(err: AdvisorError) -> Self {
        agent_core::AgentError::ToolExecution(err.to_string())
    }
}
