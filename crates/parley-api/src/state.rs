use std::sync::Arc;

use parley_llm::ChatClient;
use parley_persist::PersistenceClient;

use crate::config::Config;
use crate::services::{ChatOrchestrator, InFlight, WeatherProvider};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub orchestrator: Arc<ChatOrchestrator>,
    /// `None` when no weather API key is configured
    pub weather: Option<Arc<dyn WeatherProvider>>,
    pub in_flight: InFlight,
}

impl AppState {
    pub fn new(
        config: Config,
        persist: Arc<dyn PersistenceClient>,
        llm_client: Arc<dyn ChatClient>,
        weather: Option<Arc<dyn WeatherProvider>>,
    ) -> Self {
        let orchestrator = ChatOrchestrator::new(
            llm_client,
            Arc::clone(&persist),
            config.llm.system_prompt.clone(),
        )
        .with_max_tokens(config.llm.max_tokens);

        Self {
            config: Arc::new(config),
            persist,
            orchestrator: Arc::new(orchestrator),
            weather,
            in_flight: InFlight::new(),
        }
    }
}
