//! Currency Converter Tool
//!
//! Converts between currencies using the simplified static rate table.

use async_trait::async_trait;

use agent_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolInvocation, ToolResult, ToolSchema,
};

use crate::error::AdvisorError;
use crate::rates::convert;

/// Tool for converting an amount between two currencies
pub struct CurrencyConverterTool;

#[async_trait]
impl Tool for CurrencyConverterTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "currency_converter".into(),
            description: "Convert an amount from one currency to another using a simplified exchange-rate table. Only direct currency pairs are supported.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "amount".into(),
                    param_type: "number".into(),
                    description: "The amount to convert".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "from_currency".into(),
                    param_type: "string".into(),
                    description: "The currency to convert from (e.g., \"USD\", \"INR\")".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "to_currency".into(),
                    param_type: "string".into(),
                    description: "The currency to convert to (e.g., \"INR\", \"USD\")".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
            ],
            category: Some("conversion".into()),
        }
    }

    async fn execute(&self, call: &ToolInvocation) -> CoreResult<ToolResult> {
        let amount = call
            .arguments
            .get("amount")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| AdvisorError::InvalidArgument("amount must be a number".into()))?;

        let from_currency = call
            .arguments
            .get("from_currency")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                AdvisorError::InvalidArgument("from_currency must be a string".into())
            })?;

        let to_currency = call
            .arguments
            .get("to_currency")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| AdvisorError::InvalidArgument("to_currency must be a string".into()))?;

        let converted = convert(amount, from_currency, to_currency)?;

        tracing::debug!(amount, from_currency, to_currency, converted, "Currency converted");

        Ok(ToolResult::success("currency_converter", format!("{}", converted))
            .with_data(serde_json::json!({ "converted_amount": converted })))
    }
}
