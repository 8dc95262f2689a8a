//! SIP Calculator Tool
//!
//! Computes the future value of a Systematic Investment Plan.

use async_trait::async_trait;

use agent_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolInvocation, ToolResult, ToolSchema,
};

use crate::error::AdvisorError;
use crate::growth::sip_future_value;

/// Tool for projecting recurring-investment growth
pub struct SipCalculatorTool;

#[async_trait]
impl Tool for SipCalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "sip_calculator".into(),
            description: "Calculate the future value of a Systematic Investment Plan (SIP): a fixed amount invested every month, compounded monthly.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "monthly_investment".into(),
                    param_type: "number".into(),
                    description: "The amount invested every month (e.g., 5000)".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "annual_interest_rate".into(),
                    param_type: "number".into(),
                    description: "Expected annual rate of return as a decimal (e.g., 0.12 for 12%)".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "years".into(),
                    param_type: "integer".into(),
                    description: "Investment tenure in whole years (e.g., 10)".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
            ],
            category: Some("planning".into()),
        }
    }

    async fn execute(&self, call: &ToolInvocation) -> CoreResult<ToolResult> {
        let monthly_investment = call
            .arguments
            .get("monthly_investment")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| {
                AdvisorError::InvalidArgument("monthly_investment must be a number".into())
            })?;

        let annual_interest_rate = call
            .arguments
            .get("annual_interest_rate")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| {
                AdvisorError::InvalidArgument("annual_interest_rate must be a number".into())
            })?;

        let years = call
            .arguments
            .get("years")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| {
                AdvisorError::InvalidArgument("years must be a non-negative integer".into())
            })?;

        let future_value = sip_future_value(monthly_investment, annual_interest_rate, years as u32);

        tracing::debug!(
            monthly_investment,
            annual_interest_rate,
            years,
            future_value,
            "SIP projection computed"
        );

        Ok(ToolResult::success("sip_calculator", format!("{}", future_value))
            .with_data(serde_json::json!({ "future_value": future_value })))
    }
}
