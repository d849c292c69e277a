use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_consignado_api::config::Config;
use crm_consignado_api::handlers::{self, AppState};
use crm_consignado_api::messaging::WhatsAppClient;

/// Main entry point for the application.
///
/// Initializes logging, configuration, the WhatsApp client and the draft
/// store, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_consignado_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let whatsapp = WhatsAppClient::new(
        config.whatsapp_api_url.clone(),
        config.whatsapp_phone_id.clone(),
        config.whatsapp_access_token.clone(),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!("✓ WhatsApp client initialized: {}", config.whatsapp_api_url);

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, Arc::new(whatsapp)));
    tracing::info!(
        "Draft store initialized ({}s idle TTL)",
        app_state.config.draft_ttl_secs
    );

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = handlers::api_routes(app_state).layer(
        ServiceBuilder::new()
            // Request size limit: 1MB is plenty for simulation forms
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            // Rate limiting: 10 req/sec per IP, burst of 20
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // SmartIpKeyExtractor falls back to the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
