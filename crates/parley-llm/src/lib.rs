pub mod types;
pub mod traits;
pub mod config;
pub mod temperature;
pub mod azure_openai;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};
pub use config::{AzureConfig, ClientFactory, DEFAULT_API_VERSION};
pub use temperature::Temperature;
pub use azure_openai::AzureOpenAIClient;
pub use types::{Message, Content, ContentPart};
