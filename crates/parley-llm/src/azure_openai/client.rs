// Azure OpenAI chat completions client

use crate::config::DEFAULT_API_VERSION;
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::{Content, ContentPart, Message};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Azure OpenAI client (HTTP direct, no SDK)
///
/// Azure OpenAI differs from OpenAI in endpoint layout and authentication:
/// - URL: https://{resource}.openai.azure.com/openai/deployments/{deployment}/...
/// - Auth header: api-key instead of Authorization: Bearer
/// - Deployment name is passed via the model parameter in each request
#[derive(Debug)]
pub struct AzureOpenAIClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_version: String,
}

impl AzureOpenAIClient {
    pub fn builder() -> AzureOpenAIClientBuilder {
        AzureOpenAIClientBuilder::default()
    }

    /// Build chat completion request payload
    pub(crate) fn build_chat_request(&self, messages: Vec<Message>, options: &ChatOptions) -> Value {
        let azure_messages: Vec<Value> = messages.into_iter().map(convert_message).collect();

        let mut obj = Map::new();
        obj.insert("messages".to_string(), Value::Array(azure_messages));

        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }

        Value::Object(obj)
    }

    /// Full URL for a deployment path
    pub(crate) fn build_url(&self, deployment_name: &str, path: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint, deployment_name, path, self.api_version
        )
    }
}

fn convert_message(message: Message) -> Value {
    let role = message.role().to_string();
    let (content, name) = match message {
        Message::System { content, name }
        | Message::Human { content, name }
        | Message::AI { content, name } => (content, name),
    };

    let mut obj = serde_json::json!({
        "role": role,
        "content": convert_content(content),
    });
    if let (Some(name), Some(map)) = (name, obj.as_object_mut()) {
        map.insert("name".to_string(), Value::String(name));
    }
    obj
}

/// Convert Content to Azure OpenAI format (string or array)
fn convert_content(content: Content) -> Value {
    match content {
        Content::Text(s) => Value::String(s),
        Content::Parts(parts) => Value::Array(
            parts
                .into_iter()
                .map(|ContentPart::Text { text }| {
                    serde_json::json!({
                        "type": "text",
                        "text": text,
                    })
                })
                .collect(),
        ),
    }
}

#[derive(Default)]
pub struct AzureOpenAIClientBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    api_version: Option<String>,
}

impl AzureOpenAIClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the Azure OpenAI endpoint (base URL)
    /// Example: "https://my-resource.openai.azure.com"
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn build(self) -> Result<AzureOpenAIClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .context("API key is required")?;
        let endpoint = self
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .context("Endpoint is required")?;
        let api_version = self
            .api_version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let endpoint = endpoint.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "api-key",
            HeaderValue::from_str(&api_key).context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(AzureOpenAIClient {
            http_client,
            endpoint,
            api_version,
        })
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for AzureOpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(request.messages, &request.options);
        let url = self.build_url(&request.model, "chat/completions");

        tracing::debug!(url = %url, "Azure OpenAI request");
        tracing::debug!(payload = %payload, "Azure OpenAI payload");

        let response = match self.http_client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Azure OpenAI request failed");
                return Err(e).context("Failed to send request");
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %error_text, "Azure OpenAI API error");
            anyhow::bail!("Azure OpenAI API error ({}): {}", status, error_text);
        }

        let raw: Value = response
            .json()
            .await
            .context("Failed to parse response")?;
        tracing::debug!(response = %raw, "Azure OpenAI response");

        let parsed: AzureChatResponse =
            serde_json::from_value(raw.clone()).context("Unexpected response shape")?;

        let choice = parsed.choices.into_iter().next();
        Ok(ChatResponse {
            content: choice.as_ref().and_then(|c| c.message.content.clone()),
            finish_reason: choice.and_then(|c| c.finish_reason),
            usage: parsed.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            raw,
        })
    }
}

// ============================================================================
// AZURE-SPECIFIC RESPONSE TYPES (for Chat Completions)
// ============================================================================

#[derive(Debug, Deserialize)]
struct AzureChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzureOpenAIClient {
        AzureOpenAIClient::builder()
            .api_key("test-key")
            .endpoint("https://my-resource.openai.azure.com/")
            .build()
            .unwrap()
    }

    #[test]
    fn test_url_structure() {
        let url = client().build_url("gpt-4o", "chat/completions");
        assert_eq!(
            url,
            "https://my-resource.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01"
        );
    }

    #[test]
    fn test_payload_includes_temperature_only_when_set() {
        let messages = vec![
            Message::system("You are a helpful assistant."),
            Message::human("Hello"),
        ];

        let payload = client().build_chat_request(messages.clone(), &ChatOptions::new());
        assert!(payload.get("temperature").is_none());
        assert!(payload.get("max_tokens").is_none());

        let payload = client().build_chat_request(messages, &ChatOptions::new().temperature(1.0));
        assert_eq!(payload["temperature"], serde_json::json!(1.0));
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["role"], "user");
        assert_eq!(payload["messages"][1]["content"], "Hello");
    }

    #[test]
    fn test_parts_content_becomes_array() {
        let message = Message::human(Content::Parts(vec![ContentPart::Text {
            text: "Hi".to_string(),
        }]));
        let value = convert_message(message);
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "Hi");
    }
}
