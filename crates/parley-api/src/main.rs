use std::sync::Arc;

use parley_api::{
    build_router,
    config::{Config, StorageBackend},
    services::{OpenWeatherClient, WeatherProvider},
    telemetry::init_logging,
    AppState,
};
use parley_llm::ClientFactory;
use parley_persist::{InMemoryPersistenceClient, PersistenceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    tracing::info!("Starting Parley API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!("Initializing Azure OpenAI client");
    let llm_client = ClientFactory::create_chat_client(config.azure())?;

    let persist = connect_storage(&config).await?;

    // Seed models from config
    for model in &config.models {
        persist.upsert_model(model.clone()).await?;
        tracing::info!(
            name = %model.name,
            deployment = %model.deployment,
            active = model.active,
            "Registered model"
        );
    }

    let weather: Option<Arc<dyn WeatherProvider>> = match &config.weather_api_key {
        Some(key) => Some(Arc::new(OpenWeatherClient::new(&config.weather, key.as_str())?)),
        None => {
            tracing::warn!("WEATHER_API_KEY not set; weather lookups are disabled");
            None
        }
    };

    let state = Arc::new(AppState::new(config.clone(), persist, llm_client, weather));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_storage(config: &Config) -> anyhow::Result<Arc<dyn PersistenceClient>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; chats are lost on restart");
            Ok(Arc::new(InMemoryPersistenceClient::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::Mongodb => {
            let uri = config
                .mongodb_uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("MONGODB_URI is required for the mongodb backend"))?;

            tracing::info!("Connecting to MongoDB");
            let client =
                parley_persist::MongoPersistenceClient::connect(uri, &config.storage.database)
                    .await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::Mongodb => {
            anyhow::bail!("storage.backend = \"mongodb\" needs the `mongodb` feature")
        }
    }
}
