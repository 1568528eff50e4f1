use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use engage_core::error::ApiError;
use engage_core::session::DecisionRequest;
use engage_core::Decision;

use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/decide", post(decide))
}

/// Decide whether to show an engagement popup for a session snapshot
///
/// Sessions off the product/cart pages or younger than 30 seconds are answered
/// immediately with no popup. Everything else is analyzed; any analysis failure
/// also answers with no popup, never with an error status.
#[utoipa::path(
    post,
    path = "/decide",
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Popup decision", body = Decision),
        (status = 400, description = "Invalid session snapshot", body = ApiError),
        (status = 429, description = "Rate limited", body = ApiError)
    ),
    tag = "decisions"
)]
pub async fn decide(
    State(state): State<AppState>,
    AppJson(req): AppJson<DecisionRequest>,
) -> Json<Decision> {
    Json(engage_core::decide(&state.analyzer, &req.session).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{CannedReasoner, state_with};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const HELPFUL_REPLY: &str = r#"Sure! {"should_show": true, "message": "Need help deciding? Check our size guide.", "ttl_seconds": 45} Hope this helps!"#;

    async fn post_decide(reasoner: std::sync::Arc<CannedReasoner>, body: Value) -> (StatusCode, Value) {
        let app = router().with_state(state_with(reasoner));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/decide")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (status, serde_json::from_slice(&bytes).expect("body is json"))
    }

    fn product_session() -> Value {
        json!({
            "session": {
                "events": [
                    {"type": "page_view", "page": "product", "meta": {"path": "/products/tee"}, "timestamp": 500},
                    {"type": "click", "page": "product", "meta": {"action": "add_to_cart"}, "timestamp": 1000}
                ],
                "current_page": "product",
                "cart_items": 0,
                "time_on_site": 45
            }
        })
    }

    #[tokio::test]
    async fn eligible_session_gets_reasoner_message() {
        let reasoner = CannedReasoner::new(HELPFUL_REPLY);
        let (status, body) = post_decide(reasoner.clone(), product_session()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "should_show": true,
                "message": "Need help deciding? Check our size guide.",
                "ttl_seconds": 45
            })
        );
        assert_eq!(reasoner.call_count(), 1);
    }

    #[tokio::test]
    async fn gated_session_skips_reasoner() {
        let reasoner = CannedReasoner::new(HELPFUL_REPLY);
        let (status, body) = post_decide(
            reasoner.clone(),
            json!({"session": {"events": [], "current_page": "home", "time_on_site": 20}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"should_show": false, "message": null, "ttl_seconds": 0}));
        assert_eq!(reasoner.call_count(), 0);
    }

    #[tokio::test]
    async fn show_without_message_is_answered_as_no_popup() {
        let reasoner = CannedReasoner::new(r#"{"should_show": true, "message": null, "ttl_seconds": 60}"#);
        let (_, body) = post_decide(reasoner, product_session()).await;
        assert_eq!(body, json!({"should_show": false, "message": null, "ttl_seconds": 0}));
    }

    #[tokio::test]
    async fn unparseable_reply_is_answered_as_no_popup() {
        let reasoner = CannedReasoner::new("I'd rather not say.");
        let (status, body) = post_decide(reasoner, product_session()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["should_show"], false);
    }

    #[tokio::test]
    async fn invalid_snapshot_is_a_client_error() {
        let reasoner = CannedReasoner::new(HELPFUL_REPLY);
        let (status, body) = post_decide(
            reasoner.clone(),
            json!({"session": {"events": [], "time_on_site": 45}}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["field"], "current_page");
        assert_eq!(reasoner.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_event_type_is_a_client_error() {
        let (status, body) = post_decide(
            CannedReasoner::new(HELPFUL_REPLY),
            json!({"session": {
                "events": [{"type": "scroll", "page": "product", "timestamp": 1}],
                "current_page": "product",
                "time_on_site": 45
            }}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
    }
}
