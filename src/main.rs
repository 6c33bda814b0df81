use doc_chat::api::{create_router, AppState};
use doc_chat::application::{ChatService, EngineRegistry, IndexService};
use doc_chat::domain::ports::{DocumentStore, RetrievalBackend};
use doc_chat::infrastructure::{AnthropicLlm, Config, FsDocumentStore, RagBackend, TextEmbedding};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Arc::new(Config::from_env());

    let embedding = Arc::new(TextEmbedding::from_config(&config.embedding));
    let llm = Arc::new(AnthropicLlm::from_config(&config.llm));
    let backend: Arc<dyn RetrievalBackend> = Arc::new(RagBackend::new(
        embedding,
        llm,
        config.llm.system_prompt.clone(),
        config.chat.top_k,
    ));

    let documents: Arc<dyn DocumentStore> =
        Arc::new(FsDocumentStore::new(config.storage.upload_dir.clone()));
    let registry = Arc::new(EngineRegistry::new());
    let index = Arc::new(IndexService::new(
        documents.clone(),
        backend.clone(),
        registry.clone(),
        config.chat.chunk_size,
    ));
    let chat = Arc::new(ChatService::new(
        index.clone(),
        registry,
        backend,
        config.chat.history_window,
    ));

    let state = AppState::new(chat, index, documents, config.clone());
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
