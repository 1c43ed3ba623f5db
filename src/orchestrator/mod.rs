pub mod ingestion;
pub mod prompt;
pub mod reaper;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::limiter::RateLimiter;
use crate::models::{ConversationTurn, Profile};
use crate::services::completion::CompletionService;
use crate::services::notifier::{NotificationSink, TurnNotification};
use crate::services::weather::WeatherService;
use crate::storage::{ProfileStore, SessionStore};

pub use prompt::compose_system_prompt;

/// Stored as the assistant turn when the upstream answers with empty content.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I could not generate a response.";

/// What a webhook turn resolved to. The transport layer decides how each
/// variant is worded for the guest.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    Replied(String),
    EmptyInput,
    RateLimited,
    ProfileMissing,
    UpstreamFailure,
}

/// Per-turn generation settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub booking_url: String,
    pub fallback_language: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Drives one guest message through the full pipeline: rate limit, profile
/// lookup, weather, history, completion, persistence, notification.
pub struct ConversationOrchestrator {
    sessions: Arc<SessionStore>,
    profiles: Arc<ProfileStore>,
    weather: Arc<WeatherService>,
    completion: Arc<dyn CompletionService>,
    notifier: Arc<dyn NotificationSink>,
    limiter: Arc<RateLimiter>,
    settings: TurnSettings,
}

impl ConversationOrchestrator {
    pub fn new(
        sessions: Arc<SessionStore>,
        profiles: Arc<ProfileStore>,
        weather: Arc<WeatherService>,
        completion: Arc<dyn CompletionService>,
        notifier: Arc<dyn NotificationSink>,
        limiter: Arc<RateLimiter>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            sessions,
            profiles,
            weather,
            completion,
            notifier,
            limiter,
            settings,
        }
    }

    pub async fn handle_turn(
        &self,
        conversant_id: &str,
        profile_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> ReplyOutcome {
        let text = text.trim();
        if conversant_id.is_empty() || text.is_empty() {
            return ReplyOutcome::EmptyInput;
        }

        if !self.limiter.check(conversant_id, now).await {
            tracing::debug!("Rate limit hit for {}", conversant_id);
            return ReplyOutcome::RateLimited;
        }

        let Some(profile) = self.profiles.get(profile_id).await else {
            tracing::warn!("No profile configured under id '{}'", profile_id);
            return ReplyOutcome::ProfileMissing;
        };

        let snapshot = self.weather.snapshot(now).await;

        // The user turn is persisted before the upstream call so a failed
        // completion still leaves the guest's message in the history.
        let mut session = self.sessions.get_or_create(conversant_id, now).await;
        self.sessions
            .append_and_trim(&mut session, ConversationTurn::user(text));
        self.sessions.save(session.clone(), now).await;

        let system_prompt = prompt::compose_system_prompt(
            &profile,
            snapshot.as_ref(),
            &self.settings.booking_url,
            &self.settings.fallback_language,
        );

        let reply = match self
            .completion
            .complete(
                &system_prompt,
                &session.messages,
                self.settings.temperature,
                Some(self.settings.max_tokens),
            )
            .await
        {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => EMPTY_REPLY_FALLBACK.to_string(),
            Err(e) => {
                tracing::error!("Completion call failed: {}", e);
                return ReplyOutcome::UpstreamFailure;
            }
        };

        self.sessions
            .append_and_trim(&mut session, ConversationTurn::assistant(reply.clone()));
        self.sessions.save(session, now).await;

        self.dispatch_notification(conversant_id, text, &reply, &profile, now);

        ReplyOutcome::Replied(reply)
    }

    /// Fires the monitoring notification on a detached task. The guest reply
    /// neither waits on it nor learns whether it succeeded.
    fn dispatch_notification(
        &self,
        conversant_id: &str,
        guest_message: &str,
        bot_reply: &str,
        profile: &Profile,
        now: DateTime<Utc>,
    ) {
        let sink = self.notifier.clone();
        let event = TurnNotification {
            conversant_id: conversant_id.to_string(),
            guest_message: guest_message.to_string(),
            bot_reply: bot_reply.to_string(),
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            occurred_at: now,
        };
        tokio::spawn(async move {
            if let Err(e) = sink.notify(&event).await {
                tracing::warn!("Turn notification failed: {}", e);
            }
        });
    }
}
