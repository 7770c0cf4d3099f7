use std::net::SocketAddr;
use std::sync::Arc;

use kb_api::api::{create_router, AppState};
use kb_api::application::DocumentService;
use kb_api::infrastructure::{Config, QdrantVectorStore, TextEmbedding};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let store = QdrantVectorStore::connect(&config.qdrant.url).await?;
    info!(url = %config.qdrant.url, "Qdrant client initialized");

    let embedding = TextEmbedding::from_config(&config.embedding);

    let documents = Arc::new(DocumentService::new(
        Arc::new(embedding),
        Arc::new(store),
        config.collection.clone(),
        config.embedding.dimension,
    ));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(documents, config);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
