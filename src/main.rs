use chaste_indicator::config::Config;
use chaste_indicator::services::PipelineService;
use chaste_indicator::sources::{MarketDataProvider, YahooFinanceClient};
use chaste_indicator::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chaste_indicator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Starting Chaste Indicator server on {}:{}", config.host, config.port);

    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(YahooFinanceClient::new(&config.provider)?);
    info!(
        "Using {} market data ({} symbol aliases)",
        provider.name(),
        config.provider.symbol_aliases.len()
    );

    let state = AppState::new(PipelineService::new(provider));

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = chaste_indicator::app(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Chaste Indicator server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
