use axum::{extract::State, Extension, Json};
use doa_core::CampaignSnapshot;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeCampaignRequest {
    #[serde(default)]
    pub url: String,
}

/// `POST /api/v1/campaigns/scrape`
///
/// Rejects anything that is not a Vakinha campaign URL before fetching.
/// A fetch failure is not an error here: the snapshot then carries only
/// `fetched_at` and the caller keeps its manually entered values.
pub(super) async fn scrape_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScrapeCampaignRequest>,
) -> Result<Json<ApiResponse<CampaignSnapshot>>, ApiError> {
    let url = doa_scraper::validate_campaign_url(&body.url)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let snapshot = state.campaigns.scrape_campaign(url.as_str()).await;

    Ok(Json(ApiResponse {
        data: snapshot,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::super::tests::{test_state, unreachable_pool};
    use super::super::build_app;
    use crate::middleware::RateLimitState;

    fn scrape_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/campaigns/scrape")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", "req-campaign")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn send(app: axum::Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(scrape_request(body)).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("json parse"))
    }

    #[tokio::test]
    async fn foreign_host_is_a_validation_error() {
        let app = build_app(
            test_state(unreachable_pool()),
            RateLimitState::new(10, Duration::from_secs(60)),
        );

        let (status, json) = send(app, r#"{"url":"https://example.com/vaquinha/1"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(json["meta"]["request_id"], "req-campaign");
    }

    #[tokio::test]
    async fn missing_url_is_a_validation_error() {
        let app = build_app(
            test_state(unreachable_pool()),
            RateLimitState::new(10, Duration::from_secs(60)),
        );

        let (status, json) = send(app, "{}").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn scrape_route_is_rate_limited() {
        let app = build_app(
            test_state(unreachable_pool()),
            RateLimitState::new(1, Duration::from_secs(60)),
        );

        let (first, _) = send(app.clone(), r#"{"url":""}"#).await;
        let (second, json) = send(app, r#"{"url":""}"#).await;

        assert_eq!(first, StatusCode::BAD_REQUEST);
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "rate_limited");
    }
}
