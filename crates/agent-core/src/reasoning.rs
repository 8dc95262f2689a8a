//! Reasoning Loop
//!
//! The agent's turn engine: repeatedly queries the reasoning provider,
//! dispatches requested tool invocations against the registry, and decides
//! when the turn is complete. Every failure inside a turn is converted into
//! a plain answer string at this boundary; callers never see a fault.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Message, Transcript};
use crate::provider::{GenerationOptions, ReasoningProvider};
use crate::tool::{Tool, ToolRegistry};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System instruction seeded at the top of every transcript
    pub system_prompt: String,

    /// Maximum reasoning steps per turn before giving up
    pub max_steps: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_steps: 5,
            generation: GenerationOptions::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. \
Use the available tools when a calculation is requested, and answer \
general questions directly. Be concise and accurate.";

/// Sentinel answer for a response with neither text nor tool calls
const NO_CLEAR_RESPONSE: &str = "The model did not provide a clear response.";

/// Outcome of a single provider round-trip
enum StepOutcome {
    /// The turn is complete with this answer
    Final(String),
    /// Tool results were appended; the provider must be queried again
    Continue,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn ReasoningProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn ReasoningProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(
        provider: Arc<dyn ReasoningProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Process one user turn in a persistent chat.
    ///
    /// Seeds the system instruction on first use, appends the query, runs
    /// the loop, and ensures the final answer lands in the transcript as an
    /// assistant message.
    pub async fn chat(&self, transcript: &mut Transcript, query: &str) -> String {
        if !transcript.starts_with_system() {
            let mut seeded = Transcript::with_system_instruction(&self.config.system_prompt);
            for message in transcript.messages() {
                seeded.push(message.clone());
            }
            *transcript = seeded;
        }

        transcript.push(Message::user(query));

        let answer = self.run_turn(transcript).await;

        if !transcript.ends_with_assistant() {
            transcript.push(Message::assistant(answer.clone()));
        }

        answer
    }

    /// Run a single query statelessly: fresh transcript, run, discard.
    ///
    /// Used by batch evaluation; consecutive calls share no state.
    pub async fn ask(&self, query: &str) -> String {
        let mut transcript = Transcript::with_system_instruction(&self.config.system_prompt);
        transcript.push(Message::user(query));
        self.run_turn(&mut transcript).await
    }

    /// Drive the loop until a final answer or the step budget runs out.
    ///
    /// Never returns an error: provider failures, tool failures, and budget
    /// exhaustion all become answer strings.
    pub async fn run_turn(&self, transcript: &mut Transcript) -> String {
        let query = transcript.last_user_content().unwrap_or_default().to_string();

        for step in 0..self.config.max_steps {
            tracing::debug!(step = step + 1, "Running reasoning step");

            match self.step(transcript).await {
                Ok(StepOutcome::Final(answer)) => return answer,
                Ok(StepOutcome::Continue) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Turn aborted on provider failure");
                    return format!("An unexpected internal error occurred: {}", e);
                }
            }
        }

        let last_entry = transcript
            .last()
            .map(|m| m.content_preview(100))
            .unwrap_or_default();

        format!(
            "Agent reached the maximum of {} steps without a final answer for query '{}'. \
             Last transcript entry: {}",
            self.config.max_steps,
            preview(&query, 50),
            last_entry
        )
    }

    /// One provider round-trip plus dispatch of any requested invocations
    async fn step(&self, transcript: &mut Transcript) -> Result<StepOutcome> {
        let response = self
            .provider
            .complete(
                transcript.messages(),
                &self.tools.schemas(),
                &self.config.generation,
            )
            .await?;

        if response.has_tool_calls() {
            let inline_text = response.text().map(String::from);
            transcript.push(Message::assistant_with_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let Some(tool) = self.tools.get(&call.name) else {
                    // Short-circuit: remaining invocations in the batch are
                    // not executed.
                    let reason = format!("Unknown tool requested: {}", call.name);
                    tracing::warn!(tool = %call.name, "Unknown tool requested");
                    transcript.push(Message::tool_error(&call.id, &reason));
                    return Ok(StepOutcome::Final(reason));
                };

                tracing::debug!(tool = %call.name, "Executing tool");

                match self.execute_tool(tool, call).await {
                    Ok(output) => {
                        transcript.push(Message::tool_result(&call.id, output));
                    }
                    Err(e) => {
                        // Short-circuit on the first failure, before any
                        // inline-text inspection.
                        transcript.push(Message::tool_error(&call.id, format!("ERROR: {}", e)));
                        return Ok(StepOutcome::Final(format!(
                            "An error occurred while using a tool: {}",
                            e
                        )));
                    }
                }
            }

            // Whole batch succeeded. Inline text, if any, is the answer.
            return Ok(match inline_text {
                Some(text) => StepOutcome::Final(text),
                None => StepOutcome::Continue,
            });
        }

        if let Some(text) = response.text() {
            let text = text.to_string();
            transcript.push(Message::assistant(&text));
            return Ok(StepOutcome::Final(text));
        }

        Ok(StepOutcome::Final(NO_CLEAR_RESPONSE.into()))
    }

    /// Validate and execute one invocation, returning the stringified output
    async fn execute_tool(
        &self,
        tool: Arc<dyn Tool>,
        call: &crate::tool::ToolInvocation,
    ) -> Result<String> {
        tool.validate(call)?;
        let result = tool.execute(call).await?;
        Ok(result.output)
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// First `max_chars` characters of a string, for diagnostics
fn preview(s: &str, max_chars: usize) -> String {
    let preview: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn ReasoningProvider>>,
    tools: Vec<Arc<dyn Tool>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Vec::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn ReasoningProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn max_steps(mut self, max: usize) -> Self {
        self.config.max_steps = max;
        self
    }

    /// Build the agent. Fails on a missing provider or duplicate tool names.
    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let mut registry = ToolRegistry::new();
        for tool in self.tools {
            registry.register_boxed(tool)?;
        }

        Ok(Agent::new(provider, Arc::new(registry), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ModelInfo, ModelResponse, ProviderInfo};
    use crate::tool::{ParameterSchema, ToolInvocation, ToolResult, ToolSchema};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that replays a script of responses and records every
    /// transcript it was handed.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<ModelResponse>>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<ModelResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls_made(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn transcript_seen(&self, call: usize) -> Vec<Message> {
            self.seen.lock().unwrap()[call].clone()
        }
    }

    #[async_trait]
    impl ReasoningProvider for ScriptedProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "Scripted".into(),
                version: None,
                models: Vec::new(),
                supports_tools: true,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            _tools: &[ToolSchema],
            _options: &GenerationOptions,
        ) -> Result<ModelResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AgentError::Provider("script exhausted".into())))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    fn text_response(text: &str) -> Result<ModelResponse> {
        Ok(ModelResponse {
            content: Some(text.into()),
            tool_calls: Vec::new(),
            model: "test".into(),
            usage: None,
            finish_reason: None,
        })
    }

    fn tool_response(content: Option<&str>, calls: Vec<ToolInvocation>) -> Result<ModelResponse> {
        Ok(ModelResponse {
            content: content.map(String::from),
            tool_calls: calls,
            model: "test".into(),
            usage: None,
            finish_reason: None,
        })
    }

    fn empty_response() -> Result<ModelResponse> {
        Ok(ModelResponse {
            content: None,
            tool_calls: Vec::new(),
            model: "test".into(),
            usage: None,
            finish_reason: None,
        })
    }

    fn invocation(name: &str, id: &str) -> ToolInvocation {
        ToolInvocation {
            name: name.into(),
            arguments: HashMap::new(),
            id: id.into(),
        }
    }

    /// Tool that counts how many times it was executed
    struct CountingTool {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "counter".into(),
                description: "Counts executions".into(),
                parameters: Vec::new(),
                category: None,
            }
        }

        async fn execute(&self, _call: &ToolInvocation) -> Result<ToolResult> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResult::success("counter", "counted"))
        }
    }

    /// Tool that always fails with a typed execution error
    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "broken".into(),
                description: "Always fails".into(),
                parameters: Vec::new(),
                category: None,
            }
        }

        async fn execute(&self, _call: &ToolInvocation) -> Result<ToolResult> {
            Err(AgentError::ToolExecution(
                "Exchange rate not available for INR to JPY".into(),
            ))
        }
    }

    fn agent_with(
        provider: Arc<ScriptedProvider>,
        tools: Vec<Arc<dyn Tool>>,
        max_steps: usize,
    ) -> Agent {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register_boxed(tool).unwrap();
        }
        Agent::new(
            provider,
            Arc::new(registry),
            AgentConfig {
                max_steps,
                ..AgentConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_direct_text_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("Hello there!")]));
        let agent = agent_with(provider.clone(), vec![], 5);

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("Hi"));

        let answer = agent.run_turn(&mut transcript).await;
        assert_eq!(answer, "Hello there!");
        assert!(transcript.ends_with_assistant());
        assert_eq!(provider.calls_made(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_trip_then_answer() {
        let count = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(None, vec![invocation("counter", "call_1")]),
            text_response("Done: counted once."),
        ]));
        let agent = agent_with(
            provider.clone(),
            vec![Arc::new(CountingTool { count: count.clone() })],
            5,
        );

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("count for me"));

        let answer = agent.run_turn(&mut transcript).await;
        assert_eq!(answer, "Done: counted once.");
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(provider.calls_made(), 2);

        // Second round-trip must have seen the tool result in transcript
        let second = provider.transcript_seen(1);
        assert!(second.iter().any(|m| matches!(
            m,
            Message::Tool { tool_call_id, is_error: false, .. } if tool_call_id == "call_1"
        )));
    }

    #[tokio::test]
    async fn test_inline_text_with_successful_batch_is_final() {
        let count = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider::new(vec![tool_response(
            Some("The count is done."),
            vec![invocation("counter", "call_1")],
        )]));
        let agent = agent_with(
            provider.clone(),
            vec![Arc::new(CountingTool { count: count.clone() })],
            5,
        );

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("count"));

        let answer = agent.run_turn(&mut transcript).await;
        assert_eq!(answer, "The count is done.");
        assert_eq!(count.load(Ordering::SeqCst), 1);
        // No second round-trip: inline text after a clean batch is final
        assert_eq!(provider.calls_made(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_short_circuits_batch() {
        let count = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider::new(vec![tool_response(
            None,
            vec![invocation("nonexistent", "call_1"), invocation("counter", "call_2")],
        )]));
        let agent = agent_with(
            provider.clone(),
            vec![Arc::new(CountingTool { count: count.clone() })],
            5,
        );

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("go"));

        let answer = agent.run_turn(&mut transcript).await;
        assert!(answer.contains("Unknown tool requested: nonexistent"));
        // The rest of the batch was never executed
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(matches!(
            transcript.last(),
            Some(Message::Tool { is_error: true, .. })
        ));
    }

    #[tokio::test]
    async fn test_tool_failure_short_circuits_batch() {
        let count = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider::new(vec![tool_response(
            Some("trailing text that must not win"),
            vec![invocation("broken", "call_1"), invocation("counter", "call_2")],
        )]));
        let agent = agent_with(
            provider.clone(),
            vec![
                Arc::new(FailingTool),
                Arc::new(CountingTool { count: count.clone() }),
            ],
            5,
        );

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("convert"));

        let answer = agent.run_turn(&mut transcript).await;
        assert!(answer.starts_with("An error occurred while using a tool:"));
        assert!(answer.contains("Exchange rate not available"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_response_sentinel() {
        let provider = Arc::new(ScriptedProvider::new(vec![empty_response()]));
        let agent = agent_with(provider, vec![], 5);

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("?"));

        let answer = agent.run_turn(&mut transcript).await;
        assert_eq!(answer, NO_CLEAR_RESPONSE);
    }

    #[tokio::test]
    async fn test_step_budget_exhausted() {
        let count = Arc::new(AtomicUsize::new(0));
        // Every step requests another tool call and never concludes
        let script: Vec<Result<ModelResponse>> = (0..6)
            .map(|i| tool_response(None, vec![invocation("counter", &format!("call_{}", i))]))
            .collect();
        let provider = Arc::new(ScriptedProvider::new(script));
        let agent = agent_with(
            provider.clone(),
            vec![Arc::new(CountingTool { count: count.clone() })],
            5,
        );

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("never ending query"));

        let answer = agent.run_turn(&mut transcript).await;
        assert!(answer.contains("maximum of 5 steps"));
        assert!(answer.contains("never ending query"));
        assert!(answer.contains("Last transcript entry:"));
        assert_eq!(provider.calls_made(), 5);
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(AgentError::Provider(
            "connection reset".into(),
        ))]));
        let agent = agent_with(provider, vec![], 5);

        let mut transcript = Transcript::with_system_instruction("sys");
        transcript.push(Message::user("hi"));

        let answer = agent.run_turn(&mut transcript).await;
        assert!(answer.starts_with("An unexpected internal error occurred:"));
    }

    #[tokio::test]
    async fn test_chat_appends_answer_and_accumulates() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(None, vec![invocation("nonexistent", "call_1")]),
            text_response("Second answer."),
        ]));
        let agent = agent_with(provider, vec![], 5);

        let mut transcript = Transcript::new();

        // First turn ends on an unknown-tool error; the last entry is a tool
        // message, so the wrapper appends the answer as an assistant message.
        let answer = agent.chat(&mut transcript, "first").await;
        assert!(answer.contains("Unknown tool requested"));
        assert!(transcript.starts_with_system());
        assert!(transcript.ends_with_assistant());
        let len_after_first = transcript.len();

        // Second turn continues the same transcript
        let answer = agent.chat(&mut transcript, "second").await;
        assert_eq!(answer, "Second answer.");
        assert!(transcript.len() > len_after_first);
    }

    #[tokio::test]
    async fn test_ask_is_stateless() {
        let count = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(None, vec![invocation("counter", "call_1")]),
            text_response("first done"),
            text_response("second done"),
        ]));
        let agent = agent_with(
            provider.clone(),
            vec![Arc::new(CountingTool { count })],
            5,
        );

        assert_eq!(agent.ask("query one").await, "first done");
        assert_eq!(agent.ask("query two").await, "second done");

        // The second query's transcript starts fresh: system + user only,
        // with no tool result carried over from query one.
        let third_call = provider.transcript_seen(2);
        assert_eq!(third_call.len(), 2);
        assert!(!third_call.iter().any(|m| matches!(m, Message::Tool { .. })));
    }

    #[tokio::test]
    async fn test_builder_rejects_duplicate_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let result = AgentBuilder::new()
            .provider(provider)
            .tool(FailingTool)
            .tool(FailingTool)
            .build();

        assert!(matches!(result, Err(AgentError::DuplicateTool(_))));
    }
}
