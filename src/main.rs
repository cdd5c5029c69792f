//! Service bootstrap: tracing, configuration, adapter wiring, axum serve.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use freightdesk::adapters::ai::{MockAiProvider, OpenAiConfig, OpenAiProvider};
use freightdesk::adapters::geocoding::{HttpGeocoder, HttpGeocoderConfig, MockGeocoder};
use freightdesk::adapters::http::{app_router, ChatAppState};
use freightdesk::adapters::knowledge::InMemoryKnowledgeStore;
use freightdesk::adapters::ticketing::{HttpTicketing, HttpTicketingConfig, MockTicketing};
use freightdesk::application::agents::{
    Agent, AgentDispatcher, DocsAgent, QuoteAgent, RouterAgent, ShipmentsAgent, SupportAgent,
};
use freightdesk::application::extractor::LlmSlotExtractor;
use freightdesk::application::{KnowledgeRetriever, LlmGateway, RetryPolicy};
use freightdesk::config::{AiProviderKind, AppConfig};
use freightdesk::ports::{AiProvider, Geocoder, TicketingService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.server.log_level.clone())
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;
    info!(environment = ?config.server.environment, "configuration loaded");

    let provider: Arc<dyn AiProvider> = match config.ai.provider {
        AiProviderKind::OpenAi => {
            let key = config.ai.openai_api_key.clone().unwrap_or_default();
            let provider_config = OpenAiConfig::new(key)
                .with_model(config.ai.model.clone())
                .with_embedding_model(config.ai.embedding_model.clone())
                .with_base_url(config.ai.base_url.clone())
                .with_timeout(config.ai.timeout());
            Arc::new(OpenAiProvider::new(provider_config)?)
        }
        AiProviderKind::Mock => Arc::new(MockAiProvider::new()),
    };

    let policy = RetryPolicy {
        max_retries: config.ai.max_retries,
        chat_backoff: config.ai.chat_backoff(),
        embed_backoff: config.ai.embed_backoff(),
    };
    let gateway = Arc::new(LlmGateway::with_policy(provider, policy));

    let geocoder: Arc<dyn Geocoder> = match &config.services.geocoder.base_url {
        Some(base_url) => Arc::new(HttpGeocoder::new(HttpGeocoderConfig {
            base_url: base_url.clone(),
            timeout: config.services.geocoder.timeout(),
            ..Default::default()
        })?),
        None => Arc::new(MockGeocoder::new()),
    };

    let ticketing: Arc<dyn TicketingService> = match &config.services.ticketing.base_url {
        Some(base_url) => {
            let token = config.services.ticketing.api_token.clone().unwrap_or_default();
            let mut ticketing_config = HttpTicketingConfig::new(base_url.clone(), token);
            ticketing_config.timeout = config.services.ticketing.timeout();
            Arc::new(HttpTicketing::new(ticketing_config)?)
        }
        None => Arc::new(MockTicketing::new()),
    };

    let store = Arc::new(InMemoryKnowledgeStore::new());
    let retriever = Arc::new(
        KnowledgeRetriever::new(gateway.clone(), store)
            .with_threshold(config.retrieval.similarity_threshold)
            .with_limit(config.retrieval.match_limit),
    );

    let extractor = Arc::new(LlmSlotExtractor::new(gateway.clone()));
    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(QuoteAgent::new(extractor, geocoder, ticketing)),
        Arc::new(DocsAgent::new(gateway.clone(), retriever)),
        Arc::new(SupportAgent::new(gateway.clone())),
        Arc::new(ShipmentsAgent::new(gateway.clone())),
    ];
    let dispatcher = Arc::new(AgentDispatcher::new(
        Arc::new(RouterAgent::new(gateway)),
        agents,
    ));

    let app = app_router(ChatAppState { dispatcher });
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
