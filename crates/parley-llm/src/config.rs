// Provider configuration and client construction

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "2024-06-01";

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Configuration for Azure OpenAI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub api_key: String,
    /// Resource base URL, e.g. "https://my-resource.openai.azure.com"
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl AzureConfig {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            api_version: default_api_version(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// The deployment name is passed per request via `ChatRequest::model`
    pub fn create_chat_client(config: AzureConfig) -> Result<Arc<dyn crate::traits::ChatClient>> {
        let client = crate::azure_openai::AzureOpenAIClient::builder()
            .api_key(config.api_key)
            .endpoint(config.endpoint)
            .api_version(config.api_version)
            .build()?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_config_defaults_api_version() {
        let config = AzureConfig::new("test-key", "https://my-resource.openai.azure.com");
        assert_eq!(config.api_version, "2024-06-01");
    }

    #[test]
    fn test_azure_config_deserialize_without_version() {
        let config: AzureConfig = serde_json::from_str(
            r#"{"api_key": "k", "endpoint": "https://my-resource.openai.azure.com"}"#,
        )
        .unwrap();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn test_factory_rejects_empty_key() {
        let config = AzureConfig::new("", "https://my-resource.openai.azure.com");
        assert!(ClientFactory::create_chat_client(config).is_err());
    }

    #[test]
    fn test_factory_builds_client() {
        let config = AzureConfig::new("test-key", "https://my-resource.openai.azure.com")
            .with_api_version("2024-02-15-preview");
        assert!(ClientFactory::create_chat_client(config).is_ok());
    }
}
