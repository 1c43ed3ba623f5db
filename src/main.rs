use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vertbot::{
    api::routes::{self, AppState},
    config::Config,
    limiter::RateLimiter,
    orchestrator::{
        ingestion::IngestionOrchestrator, reaper::Reaper, ConversationOrchestrator, TurnSettings,
    },
    services::{
        notifier::{NoopNotifier, NotificationSink, WebhookNotifier},
        pages::HttpPageFetcher,
        weather::{OpenMeteoClient, WeatherService},
        OpenAiClient,
    },
    storage::{ProfileStore, SessionStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vertbot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let config = Arc::new(Config::load()?);

    if config.openai_api_key.is_empty() {
        tracing::warn!("⚠️ openai_api_key is not set; completion calls will fail");
    }
    if config.verify_signatures && config.twilio_auth_token.is_empty() {
        tracing::warn!("⚠️ twilio_auth_token is not set; all webhook calls will be rejected");
    }

    // Stores and limiters
    let sessions = Arc::new(SessionStore::new(
        config.session_ttl(),
        config.max_history_turns,
    ));
    let profiles = Arc::new(ProfileStore::new());
    let turn_limiter = Arc::new(RateLimiter::new(
        config.turn_limit_max_requests,
        config.turn_limit_window(),
    ));
    let ingest_limiter = Arc::new(RateLimiter::new(
        config.ingest_limit_max_requests,
        config.ingest_limit_window(),
    ));

    // Upstream clients
    let completion = Arc::new(OpenAiClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));
    let weather = Arc::new(WeatherService::new(
        Arc::new(OpenMeteoClient::new(
            config.weather_base_url.clone(),
            config.weather_latitude,
            config.weather_longitude,
        )),
        config.weather_cache_ttl(),
    ));
    let notifier: Arc<dyn NotificationSink> = if config.notify_webhook_url.is_empty() {
        tracing::info!("No notify webhook configured; turn notifications disabled");
        Arc::new(NoopNotifier)
    } else {
        Arc::new(WebhookNotifier::new(config.notify_webhook_url.clone()))
    };

    // Orchestrators
    let orchestrator = Arc::new(ConversationOrchestrator::new(
        sessions.clone(),
        profiles.clone(),
        weather,
        completion.clone(),
        notifier,
        turn_limiter.clone(),
        TurnSettings {
            booking_url: config.booking_url.clone(),
            fallback_language: config.fallback_language.clone(),
            temperature: config.turn_temperature,
            max_tokens: config.turn_max_tokens,
        },
    ));
    let ingestion = Arc::new(IngestionOrchestrator::new(
        profiles.clone(),
        Arc::new(HttpPageFetcher::new()),
        completion,
        config.max_source_bytes,
    ));

    // Start maintenance sweeps in background
    let reaper = Reaper::new(sessions.clone(), turn_limiter, ingest_limiter.clone());
    let sweep_interval = Duration::from_secs(config.reaper_interval_secs);
    tokio::spawn(async move {
        reaper.run_periodically(sweep_interval).await;
    });

    // Create application state
    let state = AppState {
        config: config.clone(),
        sessions,
        profiles,
        orchestrator,
        ingestion,
        ingest_limiter,
        started_at: Instant::now(),
    };

    let app = routes::create_router(state);

    // Start server
    let addr_str = format!("0.0.0.0:{}", config.server_port);
    let addr: SocketAddr = addr_str.parse().expect("Invalid address");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 Vertbot listening on {}", addr);
    tracing::info!("💬 Webhook: POST /webhook/whatsapp");
    tracing::info!("📚 Default profile: {}", config.default_profile_id);
    tracing::info!("🌤️ Weather: {}, {}", config.weather_latitude, config.weather_longitude);

    axum::serve(listener, app).await?;

    Ok(())
}
