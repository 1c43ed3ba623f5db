use axum::{
    extract::{Form, OriginalUri, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::dto::{
    ErrorResponse, HealthResponse, IngestRequest, ProfileResponse, SeedRequest,
};
use crate::api::twiml;
use crate::auth;
use crate::config::Config;
use crate::limiter::RateLimiter;
use crate::models::Profile;
use crate::orchestrator::ingestion::{IngestError, IngestionOrchestrator};
use crate::orchestrator::{ConversationOrchestrator, ReplyOutcome};
use crate::storage::{is_valid_profile_id, ProfileStore, SessionStore};

// Guest-facing fallback texts for everything that is not a model reply.
const MSG_EMPTY_INPUT: &str = "Sorry, I could not understand your message.";
const MSG_RATE_LIMITED: &str =
    "You're sending messages too quickly. Please wait a moment and try again.";
const MSG_NO_PROFILE: &str =
    "This concierge is not configured yet. Please contact the host directly.";
const MSG_UPSTREAM_FAILURE: &str =
    "I'm having trouble thinking right now. Please try again in a moment.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub profiles: Arc<ProfileStore>,
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub ingestion: Arc<IngestionOrchestrator>,
    pub ingest_limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/whatsapp", post(whatsapp_webhook))
        .route("/ingest", post(ingest_profile))
        .route("/seed", post(seed_profile))
        .route("/profile/{id}", get(get_profile))
        .route("/health", get(health_check))
        .route("/", get(root))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /webhook/whatsapp - inbound guest message from Twilio.
///
/// Always answers 200 with a TwiML document once past signature
/// verification; every failure mode becomes a polite message rather than an
/// HTTP error, because an error status would surface to Twilio, not the guest.
async fn whatsapp_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Form(params): Form<BTreeMap<String, String>>,
) -> Response {
    if state.config.verify_signatures {
        let signature = headers
            .get("x-twilio-signature")
            .and_then(|v| v.to_str().ok());
        let url = request_url(&headers, &uri);
        let valid = signature
            .map(|sig| {
                auth::verify_twilio_signature(
                    &state.config.twilio_auth_token,
                    sig,
                    &url,
                    &params,
                )
            })
            .unwrap_or(false);
        if !valid {
            tracing::warn!("Rejected webhook call with missing or invalid signature");
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }
    }

    let from = params.get("From").map(String::as_str).unwrap_or("");
    let body = params.get("Body").map(String::as_str).unwrap_or("");
    tracing::info!("Inbound message from {}", from);

    let outcome = state
        .orchestrator
        .handle_turn(from, &state.config.default_profile_id, body, Utc::now())
        .await;

    let message = match outcome {
        ReplyOutcome::Replied(text) => text,
        ReplyOutcome::EmptyInput => MSG_EMPTY_INPUT.to_string(),
        ReplyOutcome::RateLimited => MSG_RATE_LIMITED.to_string(),
        ReplyOutcome::ProfileMissing => MSG_NO_PROFILE.to_string(),
        ReplyOutcome::UpstreamFailure => MSG_UPSTREAM_FAILURE.to_string(),
    };

    (
        [(header::CONTENT_TYPE, "text/xml")],
        twiml::message_response(&message),
    )
        .into_response()
}

/// POST /ingest - build a profile from scraped web pages.
async fn ingest_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IngestRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, Json<ErrorResponse>)> {
    let caller = client_addr(&headers);
    if !state.ingest_limiter.check(&caller, Utc::now()).await {
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Too many requests. Try again later.".to_string(),
            }),
        ));
    }

    let profile = state
        .ingestion
        .ingest(
            &request.profile_id,
            &request.name,
            request.locale,
            &request.urls,
        )
        .await
        .map_err(ingest_error_response)?;

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

/// POST /seed - store operator-supplied profile content directly.
async fn seed_profile(
    State(state): State<AppState>,
    Json(request): Json<SeedRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, Json<ErrorResponse>)> {
    let profile = state
        .ingestion
        .seed(
            &request.profile_id,
            &request.name,
            request.locale,
            &request.content,
        )
        .await
        .map_err(ingest_error_response)?;

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

/// GET /profile/{id}
async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, (StatusCode, Json<ErrorResponse>)> {
    if !is_valid_profile_id(&id) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid profile ID".to_string(),
            }),
        ));
    }
    match state.profiles.get(&id).await {
        Some(profile) => Ok(Json(profile)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Profile not found".to_string(),
            }),
        )),
    }
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        profiles: state.profiles.len().await,
        sessions: state.sessions.len().await,
    })
}

/// GET /
async fn root() -> &'static str {
    "Vertbot concierge gateway is running."
}

/// Rebuilds the public URL Twilio signed, trusting the proxy headers the
/// tunnel in front of this service sets.
fn request_url(headers: &HeaderMap, uri: &axum::http::Uri) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}://{}{}", proto, host, path)
}

fn client_addr(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn ingest_error_response(err: IngestError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        IngestError::Validation(_) => StatusCode::BAD_REQUEST,
        IngestError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
