pub mod domain;

pub use domain::{ConversationTurn, Profile, Role, Session, WeatherSnapshot};
