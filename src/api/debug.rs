//! Manual check routes. They bypass the webhook dispatcher entirely and are
//! only mounted when `ENABLE_DEBUG_ROUTES` is set.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::helpers::err_response;
use super::server::AppState;
use crate::core::models::{SummaryJob, TimeWindow};
use crate::slack::response_builder::TEST_MESSAGE;
use crate::worker::deliver::deliver_reply;

/// Requester recorded on jobs started from the debug route.
const DEBUG_REQUESTER: &str = "debug";

#[derive(Debug, Deserialize)]
pub struct TodaySummaryQuery {
    pub channel_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodaySummaryResponse {
    pub channel_id: String,
    pub date: String,
    pub summary: String,
    pub success: bool,
    pub failure_detail: Option<String>,
}

/// `GET /slack/today_summary?channel_id=C...`
///
/// Runs the pipeline inline for the given channel (or the default one) and
/// returns its result. The summary is also posted to the channel.
pub async fn today_summary_handler(
    State(app_state): State<AppState>,
    Query(query): Query<TodaySummaryQuery>,
) -> Json<TodaySummaryResponse> {
    let channel_id = query
        .channel_id
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| app_state.default_channel_id().to_string());

    let now = Utc::now();
    let tz = app_state.timezone();
    let window = TimeWindow::start_of_day_until(now, tz);
    let job = SummaryJob::new(&channel_id, DEBUG_REQUESTER, window);
    info!(
        correlation_id = %job.correlation_id,
        channel_id = %channel_id,
        "Running summary from debug route"
    );

    let result = app_state.pipeline().run(&job).await;

    Json(TodaySummaryResponse {
        channel_id,
        date: now.with_timezone(&tz).date_naive().to_string(),
        summary: result.text,
        success: result.success,
        failure_detail: result.failure_detail,
    })
}

/// `GET /slack/test_message`
pub async fn test_message_handler(State(app_state): State<AppState>) -> Response {
    let channel_id = app_state.default_channel_id();
    match deliver_reply(app_state.chat(), channel_id, TEST_MESSAGE).await {
        Ok(()) => Json(json!({ "ok": true, "channel_id": channel_id })).into_response(),
        Err(e) => err_response(StatusCode::BAD_GATEWAY, &e.to_string()),
    }
}
