//! Mistral Reasoning Provider
//!
//! Implementation of `ReasoningProvider` for the hosted Mistral chat API.
//! The wire format is OpenAI-compatible: `/v1/chat/completions` with native
//! function calling, where requested invocations come back under
//! `tool_calls` with JSON-encoded argument strings.

use std::collections::HashMap;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{
        FinishReason, GenerationOptions, ModelInfo, ModelResponse, ProviderInfo,
        ReasoningProvider, TokenUsage,
    },
    tool::{ToolInvocation, ToolSchema},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Mistral provider configuration
#[derive(Clone, Debug)]
pub struct MistralConfig {
    /// API key (bearer token)
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MistralConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.mistral.ai".into(),
            timeout_secs: 120,
        }
    }

    /// Read configuration from environment variables.
    ///
    /// `MISTRAL_API_KEY` is required; `MISTRAL_BASE_URL` is an optional
    /// override (useful for tests and proxies).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MISTRAL_API_KEY").map_err(|_| {
            AgentError::Config("MISTRAL_API_KEY environment variable not set".into())
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("MISTRAL_BASE_URL") {
            config.base_url = base_url;
        }

        Ok(config)
    }
}

/// Mistral reasoning provider
pub struct MistralProvider {
    client: reqwest::Client,
    config: MistralConfig,
}

impl MistralProvider {
    /// Create from configuration
    pub fn from_config(config: MistralConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(MistralConfig::from_env()?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Convert transcript messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System { content } => WireMessage {
                    role: "system",
                    content: Some(content.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                Message::User { content } => WireMessage {
                    role: "user",
                    content: Some(content.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                Message::Assistant { content, tool_calls } => WireMessage {
                    role: "assistant",
                    content: Some(content.clone().unwrap_or_default()),
                    tool_calls: if tool_calls.is_empty() {
                        None
                    } else {
                        Some(tool_calls.iter().map(WireToolCall::from_invocation).collect())
                    },
                    tool_call_id: None,
                },
                Message::Tool { tool_call_id, content, .. } => WireMessage {
                    role: "tool",
                    content: Some(content.clone()),
                    tool_calls: None,
                    tool_call_id: Some(tool_call_id.clone()),
                },
            })
            .collect()
    }

    /// Convert tool schemas to function definitions
    fn convert_tools(tools: &[ToolSchema]) -> Vec<WireTool> {
        tools
            .iter()
            .map(|schema| {
                let mut properties = serde_json::Map::new();
                let mut required = Vec::new();

                for param in &schema.parameters {
                    let mut spec = serde_json::Map::new();
                    spec.insert("type".into(), serde_json::json!(param.param_type));
                    spec.insert("description".into(), serde_json::json!(param.description));
                    if let Some(values) = &param.enum_values {
                        spec.insert("enum".into(), serde_json::json!(values));
                    }
                    properties.insert(param.name.clone(), serde_json::Value::Object(spec));

                    if param.required {
                        required.push(param.name.clone());
                    }
                }

                WireTool {
                    kind: "function",
                    function: WireFunctionDef {
                        name: schema.name.clone(),
                        description: schema.description.clone(),
                        parameters: serde_json::json!({
                            "type": "object",
                            "properties": properties,
                            "required": required,
                        }),
                    },
                }
            })
            .collect()
    }

    /// Convert a wire response into a `ModelResponse`
    fn convert_response(response: ChatCompletionResponse, model: &str) -> Result<ModelResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(WireToolCall::into_invocation)
            .collect::<Result<Vec<_>>>()?;

        let finish_reason = choice.finish_reason.as_deref().map(|reason| match reason {
            "length" | "model_length" => FinishReason::Length,
            "tool_calls" => FinishReason::ToolCalls,
            "content_filter" => FinishReason::ContentFilter,
            "error" => FinishReason::Error,
            _ => FinishReason::Stop,
        });

        Ok(ModelResponse {
            content: choice.message.content,
            tool_calls,
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }
}

#[async_trait]
impl ReasoningProvider for MistralProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "Mistral".into(),
            version: None,
            models,
            supports_tools: true,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Mistral health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<ModelResponse> {
        let request = ChatCompletionRequest {
            model: options.model.clone(),
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            tools: if tools.is_empty() {
                None
            } else {
                Some(Self::convert_tools(tools))
            },
            stop: options.stop_sequences.clone(),
        };

        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body: ChatCompletionResponse = response
                    .json()
                    .await
                    .map_err(|e| AgentError::Provider(e.to_string()))?;
                Self::convert_response(body, &options.model)
            }
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(AgentError::ProviderUnavailable(format!(
                    "server error: {}",
                    status
                )))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AgentError::Provider(format!(
                    "request failed with {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.endpoint("/v1/models"))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::ProviderUnavailable(format!(
                "model listing failed: {}",
                response.status()
            )));
        }

        let body: ModelListResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        Ok(body
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.id.clone(),
                id: m.id,
                context_length: m.max_context_length,
            })
            .collect())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionDef,
}

#[derive(Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default = "function_call_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_call_type() -> String {
    "function".into()
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument string on the wire; some backends send a bare
    /// object instead, so both are accepted when parsing
    arguments: serde_json::Value,
}

impl WireToolCall {
    fn from_invocation(call: &ToolInvocation) -> Self {
        Self {
            id: Some(call.id.clone()),
            kind: "function".into(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: serde_json::Value::String(
                    serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".into()),
                ),
            },
        }
    }

    fn into_invocation(self) -> Result<ToolInvocation> {
        let arguments: HashMap<String, serde_json::Value> = match self.function.arguments {
            serde_json::Value::String(raw) => serde_json::from_str(&raw).map_err(|e| {
                AgentError::Parse(format!("invalid tool-call arguments: {}", e))
            })?,
            serde_json::Value::Object(map) => map.into_iter().collect(),
            other => {
                return Err(AgentError::Parse(format!(
                    "unexpected tool-call arguments: {}",
                    other
                )))
            }
        };

        Ok(ToolInvocation {
            name: self.function.name,
            arguments,
            id: self
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ModelListResponse {
    data: Vec<WireModel>,
}

#[derive(Deserialize)]
struct WireModel {
    id: String,
    #[serde(default)]
    max_context_length: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> MistralProvider {
        let mut config = MistralConfig::new("test_api_key");
        config.base_url = server.uri();
        MistralProvider::from_config(config).unwrap()
    }

    async fn mock_completion(body: serde_json::Value) -> (MockServer, MistralProvider) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        (server, provider)
    }

    #[test]
    fn test_config_defaults() {
        let config = MistralConfig::new("key");
        assert_eq!(config.base_url, "https://api.mistral.ai");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::tool_result("call_1", "8350"),
        ];

        let converted = MistralProvider::convert_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[2].role, "tool");
        assert_eq!(converted[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_complete_basic() {
        let (_server, provider) = mock_completion(json!({
            "id": "chatcmpl-123",
            "model": "mistral-small-latest",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I assist you today?"
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        }))
        .await;

        let messages = vec![Message::system("sys"), Message::user("Hello?")];
        let response = provider
            .complete(&messages, &[], &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(
            response.content.as_deref(),
            Some("Hello! How can I assist you today?")
        );
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 27);
    }

    #[tokio::test]
    async fn test_complete_tool_request() {
        let (_server, provider) = mock_completion(json!({
            "id": "chatcmpl-tool",
            "model": "mistral-small-latest",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "currency_converter",
                            "arguments": "{\"amount\":100,\"from_currency\":\"USD\",\"to_currency\":\"INR\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {
                "prompt_tokens": 20,
                "completion_tokens": 15,
                "total_tokens": 35
            }
        }))
        .await;

        let messages = vec![Message::system("sys"), Message::user("Convert $100 to INR")];
        let response = provider
            .complete(&messages, &[], &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(response.tool_calls.len(), 1);

        let call = &response.tool_calls[0];
        assert_eq!(call.name, "currency_converter");
        assert_eq!(call.id, "call_123");
        assert_eq!(call.arguments["amount"], json!(100));
        assert_eq!(call.arguments["to_currency"], json!("INR"));
    }

    #[tokio::test]
    async fn test_object_arguments_accepted() {
        let (_server, provider) = mock_completion(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "function": {
                            "name": "sip_calculator",
                            "arguments": {"monthly_investment": 5000, "annual_interest_rate": 0.12, "years": 15}
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .await;

        let messages = vec![Message::user("sip")];
        let response = provider
            .complete(&messages, &[], &GenerationOptions::default())
            .await
            .unwrap();

        let call = &response.tool_calls[0];
        assert_eq!(call.arguments["years"], json!(15));
        // A missing id gets a locally generated one
        assert!(!call.id.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_provider_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .complete(&[Message::user("hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ProviderUnavailable(_)));
    }
}
