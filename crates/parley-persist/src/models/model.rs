use serde::{Deserialize, Serialize};

/// A user-selectable model backed by an Azure deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDeployment {
    /// Unique, user-facing name (e.g. "gpt-4o")
    pub name: String,
    /// Deployment name placed in the request URL
    pub deployment: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ModelDeployment {
    pub fn new(name: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deployment: deployment.into(),
            description: None,
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
