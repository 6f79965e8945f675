//! Reasoning layer: one model call with the phase's tools on offer.
//!
//! The orchestrator calls `respond_with_tools()` once per loop iteration and
//! decides what to do with the text or tool calls that come back.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::LlmError;
use crate::llm::{
    ChatMessage, CompletionRequest, LlmProvider, ToolCall, ToolCompletionRequest, ToolDefinition,
};

/// Context for a reasoning operation.
pub struct ReasoningContext {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub metadata: std::collections::HashMap<String, String>,
}

impl ReasoningContext {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            tools: Vec::new(),
            metadata: std::collections::HashMap::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_metadata(mut self, metadata: std::collections::HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Default for ReasoningContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Token usage from an LLM call.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// USD cost of this usage at the provider's (input, output) per-token rates.
    pub fn cost(&self, (input_rate, output_rate): (Decimal, Decimal)) -> Decimal {
        input_rate * Decimal::from(self.input_tokens) + output_rate * Decimal::from(self.output_tokens)
    }
}

/// Result of a reasoning call: either text or tool calls.
pub enum RespondResult {
    /// The model responded with text.
    Text(String),
    /// The model wants to call tools.
    ToolCalls {
        tool_calls: Vec<ToolCall>,
        /// Optional text content alongside tool calls.
        content: Option<String>,
    },
}

/// Output from a respond_with_tools call.
pub struct RespondOutput {
    pub result: RespondResult,
    pub usage: TokenUsage,
}

/// Reasoning layer that wraps an LLM provider.
pub struct Reasoning {
    llm: Arc<dyn LlmProvider>,
    system_prompt: Option<String>,
    temperature: Option<f32>,
}

impl Reasoning {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            system_prompt: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Call the LLM with tool definitions, returning either text or tool calls.
    pub async fn respond_with_tools(
        &self,
        context: &ReasoningContext,
    ) -> Result<RespondOutput, LlmError> {
        let mut messages = Vec::new();

        // Add system prompt if configured
        if let Some(ref prompt) = self.system_prompt {
            messages.push(ChatMessage::system(prompt));
        }

        // Add context messages
        messages.extend(context.messages.clone());

        // If no tools, do a simple completion
        if context.tools.is_empty() {
            let mut request = CompletionRequest::new(messages);
            request.temperature = self.temperature;
            let response = self.llm.complete(request).await?;
            return Ok(RespondOutput {
                result: RespondResult::Text(response.content),
                usage: TokenUsage {
                    input_tokens: response.input_tokens,
                    output_tokens: response.output_tokens,
                },
            });
        }

        // Call with tools
        let mut request = ToolCompletionRequest::new(messages, context.tools.clone());
        request.metadata = context.metadata.clone();
        request.temperature = self.temperature;

        let response = self.llm.complete_with_tools(request).await?;

        let usage = TokenUsage {
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
        };

        if response.tool_calls.is_empty() {
            // No tool calls, plain text reply
            Ok(RespondOutput {
                result: RespondResult::Text(response.content.unwrap_or_default()),
                usage,
            })
        } else {
            Ok(RespondOutput {
                result: RespondResult::ToolCalls {
                    tool_calls: response.tool_calls,
                    content: response.content,
                },
                usage,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::{CompletionResponse, FinishReason, Role, ToolCompletionResponse};

    /// Records the last request and replies with a fixed tool call.
    struct EchoLlm {
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl LlmProvider for EchoLlm {
        fn model_name(&self) -> &str {
            "echo"
        }

        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::ZERO, Decimal::ZERO)
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            *self.seen.lock().unwrap() = request.messages;
            Ok(CompletionResponse {
                content: "plain".into(),
                input_tokens: 3,
                output_tokens: 1,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }

        async fn complete_with_tools(
            &self,
            request: ToolCompletionRequest,
        ) -> Result<ToolCompletionResponse, LlmError> {
            *self.seen.lock().unwrap() = request.messages;
            Ok(ToolCompletionResponse {
                content: None,
                tool_calls: vec![ToolCall {
                    id: "call_1".into(),
                    name: request.tools[0].name.clone(),
                    arguments: serde_json::json!({}),
                }],
                input_tokens: 10,
                output_tokens: 5,
                finish_reason: FinishReason::ToolUse,
                response_id: None,
            })
        }
    }

    fn tool() -> ToolDefinition {
        ToolDefinition {
            name: "record_travel_preference".into(),
            description: "Record a preference".into(),
            parameters: serde_json::json!({"type": "object"}),
        }
    }

    #[test]
    fn usage_cost_applies_rates() {
        let usage = TokenUsage {
            input_tokens: 1000,
            output_tokens: 200,
        };
        let cost = usage.cost((Decimal::new(3, 6), Decimal::new(15, 6)));
        assert_eq!(cost, Decimal::new(6, 3));
        assert_eq!(usage.cost((Decimal::ZERO, Decimal::ZERO)), Decimal::ZERO);
    }

    #[tokio::test]
    async fn prepends_system_prompt_and_returns_tool_calls() {
        let llm = Arc::new(EchoLlm {
            seen: Mutex::new(Vec::new()),
        });
        let reasoning = Reasoning::new(llm.clone()).with_system_prompt("You plan trips.");
        let ctx = ReasoningContext::new()
            .with_messages(vec![ChatMessage::user("Hi")])
            .with_tools(vec![tool()]);

        let output = reasoning.respond_with_tools(&ctx).await.unwrap();

        assert_eq!(output.usage.total(), 15);
        match output.result {
            RespondResult::ToolCalls { tool_calls, .. } => {
                assert_eq!(tool_calls[0].name, "record_travel_preference")
            }
            RespondResult::Text(t) => panic!("expected tool calls, got text {t}"),
        }
        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen[0].role, Role::System);
        assert_eq!(seen[1].role, Role::User);
    }

    #[tokio::test]
    async fn no_tools_is_plain_completion() {
        let llm = Arc::new(EchoLlm {
            seen: Mutex::new(Vec::new()),
        });
        let reasoning = Reasoning::new(llm);
        let ctx = ReasoningContext::new().with_messages(vec![ChatMessage::user("Hi")]);

        let output = reasoning.respond_with_tools(&ctx).await.unwrap();
        assert!(matches!(output.result, RespondResult::Text(ref t) if t == "plain"));
    }
}
