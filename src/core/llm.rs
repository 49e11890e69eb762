use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::core::model::{
    ChatMessage, ChatModel, ModelError, ModelReply, ModelRequest, ResponseFormat, ToolCall,
    ToolChoice, ToolDefinition,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a ResponseFormat>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

/// OpenAI-compatible chat-completions client
pub struct LLMClient {
    client: Client,
    api_key: String,
    settings: Settings,
}

impl LLMClient {
    pub fn new(api_key: String, settings: Settings) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(settings.llm.request_timeout())
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.llm.base_url.trim_end_matches('/')
        )
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<ModelReply, ModelError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        let message = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?
            .message;

        match message.tool_calls {
            Some(calls) if !calls.is_empty() => Ok(ModelReply::ToolCalls(calls)),
            _ => Ok(ModelReply::Text(message.content.unwrap_or_default())),
        }
    }
}

#[async_trait]
impl ChatModel for LLMClient {
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply, ModelError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.instructions.is_empty() {
            messages.push(ChatMessage::system(request.instructions.clone()));
        }
        messages.extend(request.messages.iter().cloned());

        let body = ChatRequest {
            model: &self.settings.llm.model,
            messages,
            max_tokens: self.settings.llm.max_tokens,
            temperature: self.settings.llm.temperature,
            stream: false,
            tools: &request.tools,
            // tool_choice without tools is rejected by the API
            tool_choice: (!request.tools.is_empty()).then_some(request.tool_choice),
            response_format: request.response_format.as_ref(),
        };

        let max_retries = self.settings.llm.max_retries.max(1);
        let base_delay_ms = self.settings.llm.retry_base_delay_ms;
        let mut last_error = None;

        for attempt in 0..max_retries {
            if attempt > 0 {
                let delay = base_delay_ms * 2_u64.pow(attempt - 1);
                tracing::warn!(
                    "[LLMClient] Retrying API call (attempt {}/{}) after {}ms delay",
                    attempt + 1,
                    max_retries,
                    delay
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
            }

            let attempt_timeout = self.settings.llm.request_timeout();
            let outcome = match tokio::time::timeout(attempt_timeout, self.send_once(&body)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ModelError::Timeout {
                    timeout_ms: self.settings.llm.request_timeout_ms,
                }),
            };

            match outcome {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() => {
                    tracing::warn!("[LLMClient] {}", e);
                    last_error = Some(e);
                }
                Err(e) => {
                    tracing::error!("[LLMClient] non-retryable failure: {}", e);
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or(ModelError::EmptyResponse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::complete_within;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.llm.base_url = format!("{}/v1beta/openai/", server.uri());
        settings.llm.model = "test-model".to_string();
        settings.llm.max_retries = 2;
        settings.llm.retry_base_delay_ms = 1;
        settings
    }

    #[tokio::test]
    async fn test_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/openai/chat/completions"))
            .and(header("Authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hi there"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LLMClient::new("secret".into(), settings_for(&server)).unwrap();
        let reply = client
            .complete(ModelRequest::new("be brief", vec![ChatMessage::user("hello")]))
            .await
            .unwrap();

        assert_eq!(reply, ModelReply::Text("hi there".into()));
    }

    #[tokio::test]
    async fn test_tool_call_reply_and_tool_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "faq_lookup"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "faq_lookup", "arguments": "{\"question\":\"how are you?\"}"}
                    }]
                }}]
            })))
            .mount(&server)
            .await;

        let client = LLMClient::new("secret".into(), settings_for(&server)).unwrap();
        let tool = ToolDefinition::function("faq_lookup", "FAQ", json!({"type": "object"}));
        let request = ModelRequest::new("", vec![ChatMessage::user("how are you?")])
            .with_tools(vec![tool], ToolChoice::Auto);

        match client.complete(request).await.unwrap() {
            ModelReply::ToolCalls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name(), "faq_lookup");
                assert_eq!(calls[0].arguments().unwrap()["question"], "how are you?");
            }
            other => panic!("expected tool calls, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&server)
            .await;

        let client = LLMClient::new("wrong".into(), settings_for(&server)).unwrap();
        let err = client
            .complete(ModelRequest::new("", vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(2)
            .mount(&server)
            .await;

        let client = LLMClient::new("secret".into(), settings_for(&server)).unwrap();
        let err = client
            .complete(ModelRequest::new("", vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let mut settings = settings_for(&server);
        settings.llm.max_retries = 1;
        let client = LLMClient::new("secret".into(), settings).unwrap();
        let err = client
            .complete(ModelRequest::new("", vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_slow_attempt_is_retried_within_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(800))
                    .set_body_json(json!({
                        "choices": [{"message": {"role": "assistant", "content": "too slow"}}]
                    })),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "second try"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = settings_for(&server);
        settings.llm.request_timeout_ms = 300;
        settings.llm.max_retries = 3;
        let budget = settings.llm.call_budget();
        let client = LLMClient::new("secret".into(), settings).unwrap();

        let reply = complete_within(
            &client,
            ModelRequest::new("", vec![ChatMessage::user("hi")]),
            budget,
        )
        .await
        .unwrap();

        assert_eq!(reply, ModelReply::Text("second try".into()));
    }
}
