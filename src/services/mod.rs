pub mod completion;
pub mod notifier;
pub mod pages;
pub mod weather;

// Re-export for convenience
pub use completion::{CompletionError, CompletionService, OpenAiClient};
pub use notifier::{NoopNotifier, NotificationSink, TurnNotification, WebhookNotifier};
pub use pages::{HttpPageFetcher, PageFetcher};
pub use weather::{OpenMeteoClient, WeatherFetcher, WeatherService};
