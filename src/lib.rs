//! Vertbot - WhatsApp concierge gateway for rental properties

pub mod api;
pub mod auth;
pub mod config;
pub mod limiter;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod storage;

// Re-export main types for convenience
pub use crate::api::routes::{create_router, AppState};
pub use crate::config::Config;
pub use crate::limiter::RateLimiter;
pub use crate::models::{ConversationTurn, Profile, Role, Session, WeatherSnapshot};
pub use crate::orchestrator::ingestion::IngestionOrchestrator;
pub use crate::orchestrator::{ConversationOrchestrator, ReplyOutcome, TurnSettings};
pub use crate::services::{CompletionService, OpenAiClient, WeatherService};
pub use crate::storage::{ProfileStore, SessionStore};
