use std::sync::Arc;

use parley_llm::{ChatClient, ChatOptions, ChatRequest, ChatResponse, Message};
use parley_persist::{ChatMessage, ChatSession, MessageRole, ModelDeployment, PersistenceClient};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub const MODEL_INACTIVE: &str = "The specified model does not exist or is inactive.";
pub const NO_ACTIVE_MODELS: &str = "No active models are available. Please configure a model.";

#[derive(Debug, Clone)]
pub struct GenerateInput {
    pub message: String,
    pub model: Option<String>,
    pub temperature: f64,
    pub chat_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct GenerateOutput {
    /// Provider response body
    pub raw: serde_json::Value,
    pub chat_id: Option<Uuid>,
    /// Id of the stored assistant reply, when the exchange was stored
    pub message_id: Option<Uuid>,
    pub content: Option<String>,
}

/// Turns chat history plus a new prompt into one model call and stores the exchange
pub struct ChatOrchestrator {
    llm: Arc<dyn ChatClient>,
    persist: Arc<dyn PersistenceClient>,
    system_prompt: String,
    max_tokens: Option<u32>,
}

impl ChatOrchestrator {
    pub fn new(
        llm: Arc<dyn ChatClient>,
        persist: Arc<dyn PersistenceClient>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            persist,
            system_prompt: system_prompt.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Named model when given, otherwise the first active one
    pub async fn resolve_model(&self, name: Option<&str>) -> ApiResult<ModelDeployment> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self
                .persist
                .find_active_model(name)
                .await?
                .ok_or_else(|| ApiError::BadRequest(MODEL_INACTIVE.to_string())),
            None => self
                .persist
                .list_active_models()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| ApiError::Unavailable(NO_ACTIVE_MODELS.to_string())),
        }
    }

    pub async fn generate(&self, owner: &str, input: GenerateInput) -> ApiResult<GenerateOutput> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(ApiError::BadRequest("Message is required".to_string()));
        }

        let model = self.resolve_model(input.model.as_deref()).await?;

        // 1. Load history when continuing a chat
        let (chat, history) = match input.chat_id {
            Some(chat_id) => {
                let chat = self.owned_chat(chat_id, owner).await?;
                let history = self.persist.get_messages(chat_id).await?;
                (Some(chat), history)
            }
            None => (None, Vec::new()),
        };

        // 2. Ask the model
        let mut messages = self.build_messages(history);
        messages.push(Message::human(message));
        let response = self.call(&model, messages, input.temperature).await?;

        let Some(chat) = chat else {
            return Ok(GenerateOutput {
                raw: response.raw,
                chat_id: None,
                message_id: None,
                content: response.content,
            });
        };

        // 3. Store the exchange
        let reply = reply_text(&response)?;
        self.persist
            .save_message(ChatMessage::user(chat.id, message))
            .await?;
        let assistant = ChatMessage::assistant(chat.id, reply);
        let message_id = assistant.id;
        self.persist.save_message(assistant).await?;

        if chat.title.is_none() {
            if let Some(title) = ChatSession::title_from(message) {
                self.persist.set_chat_title(chat.id, &title).await?;
            }
        }

        tracing::info!(
            chat_id = %chat.id,
            model = %model.name,
            "Stored generated reply"
        );

        Ok(GenerateOutput {
            raw: response.raw,
            chat_id: Some(chat.id),
            message_id: Some(message_id),
            content: response.content,
        })
    }

    /// Replace the chat's last assistant reply with a fresh one
    pub async fn regenerate(
        &self,
        owner: &str,
        chat_id: Uuid,
        model: Option<&str>,
        temperature: f64,
    ) -> ApiResult<ChatMessage> {
        self.owned_chat(chat_id, owner).await?;

        let mut history = self.persist.get_messages(chat_id).await?;
        let last = match history.pop() {
            Some(last) if last.role == MessageRole::Assistant => last,
            _ => return Err(ApiError::BadRequest("Nothing to regenerate".to_string())),
        };

        let model = self.resolve_model(model).await?;
        let messages = self.build_messages(history);
        let response = self.call(&model, messages, temperature).await?;
        let reply = reply_text(&response)?;

        // Old reply goes only once the new one exists
        self.persist.delete_message(last.id).await?;
        let regenerated = ChatMessage::regenerated(chat_id, reply);
        self.persist.save_message(regenerated.clone()).await?;

        tracing::info!(
            chat_id = %chat_id,
            replaced = %last.id,
            model = %model.name,
            "Regenerated last reply"
        );

        Ok(regenerated)
    }

    /// System prompt followed by the stored history
    pub fn build_messages(&self, history: Vec<ChatMessage>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system_prompt.as_str()));
        messages.extend(history.into_iter().map(Message::from));
        messages
    }

    async fn owned_chat(&self, chat_id: Uuid, owner: &str) -> ApiResult<ChatSession> {
        self.persist
            .get_chat(chat_id, owner)
            .await?
            .ok_or_else(|| ApiError::ChatNotFound(chat_id.to_string()))
    }

    async fn call(
        &self,
        model: &ModelDeployment,
        messages: Vec<Message>,
        temperature: f64,
    ) -> ApiResult<ChatResponse> {
        let mut options = ChatOptions::new().temperature(temperature);
        options.max_tokens = self.max_tokens;

        let request = ChatRequest::new(&model.deployment, messages).with_options(options);
        Ok(self.llm.chat(request).await?)
    }
}

fn reply_text(response: &ChatResponse) -> ApiResult<String> {
    response
        .content
        .clone()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Upstream("Model returned an empty reply".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_persist::InMemoryPersistenceClient;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with the queued texts in order and records every request
    #[derive(Default)]
    struct ScriptedClient {
        replies: Mutex<Vec<anyhow::Result<String>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        fn replying(replies: Vec<anyhow::Result<String>>) -> Arc<Self> {
            let mut replies = replies;
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                requests: Mutex::default(),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
            self.requests.lock().unwrap().push(request);
            let text = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("default reply".to_string()))?;
            Ok(ChatResponse {
                content: Some(text.clone()),
                usage: None,
                finish_reason: Some("stop".to_string()),
                raw: json!({"choices": [{"message": {"role": "assistant", "content": text}}]}),
            })
        }
    }

    async fn setup(
        replies: Vec<anyhow::Result<String>>,
    ) -> (ChatOrchestrator, Arc<ScriptedClient>, Arc<InMemoryPersistenceClient>) {
        let llm = ScriptedClient::replying(replies);
        let persist = Arc::new(InMemoryPersistenceClient::new());
        persist
            .upsert_model(ModelDeployment::new("gpt-4o", "gpt-4o-prod"))
            .await
            .unwrap();
        persist
            .upsert_model(ModelDeployment::new("gpt-35", "gpt35").inactive())
            .await
            .unwrap();

        let orchestrator = ChatOrchestrator::new(llm.clone(), persist.clone(), "Be brief.");
        (orchestrator, llm, persist)
    }

    fn input(message: &str, chat_id: Option<Uuid>) -> GenerateInput {
        GenerateInput {
            message: message.to_string(),
            model: None,
            temperature: 0.7,
            chat_id,
        }
    }

    #[tokio::test]
    async fn test_resolve_model() {
        let (orchestrator, _, persist) = setup(vec![]).await;

        let model = orchestrator.resolve_model(None).await.unwrap();
        assert_eq!(model.deployment, "gpt-4o-prod");

        let err = orchestrator.resolve_model(Some("gpt-35")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == MODEL_INACTIVE));

        persist
            .upsert_model(ModelDeployment::new("gpt-4o", "gpt-4o-prod").inactive())
            .await
            .unwrap();
        let err = orchestrator.resolve_model(None).await.unwrap_err();
        assert!(matches!(err, ApiError::Unavailable(ref m) if m == NO_ACTIVE_MODELS));
    }

    #[tokio::test]
    async fn test_generate_without_chat_stores_nothing() {
        let (orchestrator, llm, persist) = setup(vec![Ok("Hi!".into())]).await;

        let output = orchestrator
            .generate("alice", input("Hello", None))
            .await
            .unwrap();

        assert_eq!(output.content.as_deref(), Some("Hi!"));
        assert!(output.message_id.is_none());
        assert_eq!(output.raw["choices"][0]["message"]["content"], "Hi!");

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-prod");
        assert_eq!(requests[0].options.temperature, Some(0.7));
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[0].messages[0].role(), "system");
        assert!(persist.list_chats("alice", None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_in_chat_sends_history_and_stores_exchange() {
        let (orchestrator, llm, persist) =
            setup(vec![Ok("First answer".into()), Ok("Second answer".into())]).await;
        let chat = persist.create_chat("alice").await.unwrap();

        orchestrator
            .generate("alice", input("First question", Some(chat.id)))
            .await
            .unwrap();
        let output = orchestrator
            .generate("alice", input("Second question", Some(chat.id)))
            .await
            .unwrap();

        let requests = llm.requests();
        // system, q1, a1, q2
        assert_eq!(requests[1].messages.len(), 4);

        let messages = persist.get_messages(chat.id).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[3].content, "Second answer");
        assert_eq!(output.message_id, Some(messages[3].id));

        let chat = persist.get_chat(chat.id, "alice").await.unwrap().unwrap();
        assert_eq!(chat.title.as_deref(), Some("First question"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_message_and_foreign_chat() {
        let (orchestrator, llm, persist) = setup(vec![]).await;
        let chat = persist.create_chat("alice").await.unwrap();

        let err = orchestrator.generate("alice", input("   ", None)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Message is required"));

        let err = orchestrator
            .generate("mallory", input("hi", Some(chat.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ChatNotFound(_)));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_call_stores_nothing() {
        let (orchestrator, _, persist) = setup(vec![Err(anyhow::anyhow!("rate limited"))]).await;
        let chat = persist.create_chat("alice").await.unwrap();

        let err = orchestrator
            .generate("alice", input("hi", Some(chat.id)))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Llm(_)));
        assert!(persist.get_messages(chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_regenerate_replaces_last_reply() {
        let (orchestrator, llm, persist) =
            setup(vec![Ok("Old".into()), Ok("New".into())]).await;
        let chat = persist.create_chat("alice").await.unwrap();
        orchestrator
            .generate("alice", input("Question", Some(chat.id)))
            .await
            .unwrap();

        let message = orchestrator
            .regenerate("alice", chat.id, None, 1.0)
            .await
            .unwrap();
        assert_eq!(message.content, "New");
        assert!(message.regenerated);

        // regenerate sees the history without the old reply
        let requests = llm.requests();
        assert_eq!(requests[1].messages.len(), 2);
        assert_eq!(requests[1].options.temperature, Some(1.0));

        let messages = persist.get_messages(chat.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].content, "New");
    }

    #[tokio::test]
    async fn test_regenerate_edge_cases() {
        let (orchestrator, _, persist) = setup(vec![Err(anyhow::anyhow!("boom"))]).await;
        let chat = persist.create_chat("alice").await.unwrap();

        let err = orchestrator
            .regenerate("alice", chat.id, None, 0.7)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Nothing to regenerate"));

        let err = orchestrator
            .regenerate("bob", chat.id, None, 0.7)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ChatNotFound(_)));

        // a failed model call keeps the old reply
        persist.save_message(ChatMessage::user(chat.id, "q")).await.unwrap();
        persist.save_message(ChatMessage::assistant(chat.id, "a")).await.unwrap();
        let err = orchestrator
            .regenerate("alice", chat.id, None, 0.7)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Llm(_)));
        assert_eq!(persist.get_messages(chat.id).await.unwrap().len(), 2);
    }
}
