use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use curable_api::{
    build_router,
    config::{Config, StorageBackend},
    state::AppState,
};
use curable_llm::{ClientFactory, OpenAIConfig};
use curable_persist::{MemoryPersistenceClient, MongoPersistenceClient, PersistenceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Curable API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!("Initializing OpenAI client");
    let mut openai_config = OpenAIConfig::new(config.openai_api_key.clone());
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_base_url(base_url.clone());
    }
    let openai = ClientFactory::create_client(openai_config)?;

    let persist: Arc<dyn PersistenceClient> = match config.storage.backend {
        StorageBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let mongo = MongoPersistenceClient::connect(&config.mongodb_uri, &config.mongodb.database).await?;
            tracing::info!("MongoDB connected");
            Arc::new(mongo)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryPersistenceClient::new())
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, persist, openai.clone(), openai));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
