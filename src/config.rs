use serde::Deserialize;
use validator::Validate;

/// Main configuration for the concierge gateway
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    /// HTTP server port
    #[validate(range(min = 1024, max = 65535))]
    pub server_port: u16,

    /// Log level (e.g., info, debug, trace)
    pub log_level: String,

    /// Base URL of the OpenAI-compatible completion endpoint
    pub openai_base_url: String,

    /// Bearer key for the completion endpoint
    pub openai_api_key: String,

    /// Completion model for turns and ingestion
    pub openai_model: String,

    /// Sampling temperature for conversational turns; ingestion always runs at 0
    #[validate(range(min = 0.0, max = 2.0))]
    pub turn_temperature: f32,

    /// Token cap per turn reply
    pub turn_max_tokens: u32,

    /// Profile that answers the WhatsApp webhook
    pub default_profile_id: String,

    /// Direct booking link; empty leaves the booking pitch out of the prompt
    pub booking_url: String,

    /// Language used when the guest's language is ambiguous
    pub fallback_language: String,

    /// Turn-monitoring webhook (e.g. an n8n flow); empty disables notifications
    pub notify_webhook_url: String,

    /// Twilio auth token for webhook signature verification
    pub twilio_auth_token: String,

    /// Disable only for local development; inbound webhooks are then unauthenticated
    pub verify_signatures: bool,

    /// User/assistant turn pairs retained per session
    #[validate(range(min = 1))]
    pub max_history_turns: usize,

    /// Idle seconds before a session expires
    #[validate(range(min = 1))]
    pub session_ttl_secs: u64,

    /// Per-conversant turn rate limit
    #[validate(range(min = 1))]
    pub turn_limit_max_requests: u32,
    #[validate(range(min = 1))]
    pub turn_limit_window_secs: u64,

    /// Per-caller ingestion rate limit
    #[validate(range(min = 1))]
    pub ingest_limit_max_requests: u32,
    #[validate(range(min = 1))]
    pub ingest_limit_window_secs: u64,

    /// Seconds a weather snapshot stays fresh
    #[validate(range(min = 1))]
    pub weather_cache_ttl_secs: u64,

    /// Base URL of the Open-Meteo API
    pub weather_base_url: String,

    /// Property coordinates for weather lookups
    pub weather_latitude: f64,
    pub weather_longitude: f64,

    /// Combined plain-text budget across all scraped pages, in bytes
    #[validate(range(min = 1))]
    pub max_source_bytes: usize,

    /// Seconds between maintenance sweeps
    #[validate(range(min = 1))]
    pub reaper_interval_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // ~/.vertbot/config.toml, if present
        let config_file = format!(
            "{}/.vertbot/config",
            std::env::var("HOME").unwrap_or_else(|_| ".".to_string())
        );
        Self::load_from(&config_file)
    }

    pub fn load_from(config_file: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            // Core defaults
            .set_default("server_port", 3000)?
            .set_default("log_level", "info")?
            // Completion
            .set_default("openai_base_url", "https://api.openai.com")?
            .set_default("openai_api_key", "")?
            .set_default("openai_model", "gpt-4.1-mini")?
            .set_default("turn_temperature", 0.7)?
            .set_default("turn_max_tokens", 500)?
            // Concierge behavior
            .set_default("default_profile_id", "default")?
            .set_default("booking_url", "")?
            .set_default("fallback_language", "English")?
            .set_default("notify_webhook_url", "")?
            // Webhook security
            .set_default("twilio_auth_token", "")?
            .set_default("verify_signatures", true)?
            // Sessions and limits
            .set_default("max_history_turns", 15)?
            .set_default("session_ttl_secs", 86400)?
            .set_default("turn_limit_max_requests", 30)?
            .set_default("turn_limit_window_secs", 60)?
            .set_default("ingest_limit_max_requests", 10)?
            .set_default("ingest_limit_window_secs", 60)?
            // Weather
            .set_default("weather_cache_ttl_secs", 1800)?
            .set_default("weather_base_url", "https://api.open-meteo.com")?
            .set_default("weather_latitude", 69.65)?
            .set_default("weather_longitude", 18.96)?
            // Ingestion
            .set_default("max_source_bytes", 24000)?
            // Maintenance
            .set_default("reaper_interval_secs", 3600)?
            .add_source(config::File::with_name(config_file).required(false))
            // Environment overrides: VERTBOT__SERVER_PORT, VERTBOT__OPENAI_API_KEY, etc.
            .add_source(config::Environment::with_prefix("VERTBOT").separator("__"))
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs as i64)
    }

    pub fn weather_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.weather_cache_ttl_secs as i64)
    }

    pub fn turn_limit_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.turn_limit_window_secs as i64)
    }

    pub fn ingest_limit_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ingest_limit_window_secs as i64)
    }
}
