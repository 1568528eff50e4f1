use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use engage_core::error::ApiError;
use engage_core::session::Event;

use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", post(ingest_event))
}

/// Acknowledgement for a tracked event. Nothing is stored.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventAck {
    pub ok: bool,
    pub received_at: DateTime<Utc>,
}

/// Accept a single tracker event
///
/// Ingestion stub: the event is logged and acknowledged. Decisions are made
/// only from the snapshot sent to `/decide`.
#[utoipa::path(
    post,
    path = "/events",
    request_body = Event,
    responses(
        (status = 200, description = "Event acknowledged", body = EventAck),
        (status = 400, description = "Invalid event", body = ApiError),
        (status = 429, description = "Rate limited", body = ApiError)
    ),
    tag = "events"
)]
pub async fn ingest_event(AppJson(event): AppJson<Event>) -> Json<EventAck> {
    tracing::debug!(
        kind = event.kind.as_str(),
        page = event.page.as_str(),
        action = event.action().unwrap_or_default(),
        timestamp = event.timestamp,
        "tracker event received"
    );

    Json(EventAck {
        ok: true,
        received_at: Utc::now(),
    })
}
