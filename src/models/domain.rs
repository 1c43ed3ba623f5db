use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn, in the order the completion API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One utterance in a conversation, either from the guest or from the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Rolling conversation state for one conversant (e.g. one WhatsApp number).
#[derive(Debug, Clone)]
pub struct Session {
    pub conversant_id: String,
    pub messages: Vec<ConversationTurn>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    pub fn fresh(conversant_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            conversant_id: conversant_id.into(),
            messages: Vec::new(),
            last_activity_at: now,
        }
    }
}

/// Knowledge document grounding the assistant for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub locale: String,
    pub content: String,
}

/// Current conditions at the property, already mapped to human-readable form.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub wind_speed: f64,
    pub description: String,
    pub is_day: bool,
    pub observed_at: String,
}
