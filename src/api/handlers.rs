//! Read-only handlers over the current board and captured snapshots

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::common::types::SnapshotLabel;
use crate::leaderboard::query::{self, OutputFormat, ViewQuery};

const CSV_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Leaderboard</title></head>
<body>
<h1>Leaderboard service</h1>
<ul>
<li><a href="/status">/status</a> liveness</li>
<li><a href="/leaderboard">/leaderboard</a> current ranking (q, skip, size, type=json|csv, blacklisted)</li>
<li><a href="/leaderboard/snapshots/start">/leaderboard/snapshots/start</a> ranking at competition start</li>
<li><a href="/leaderboard/snapshots/end">/leaderboard/snapshots/end</a> ranking at competition end</li>
</ul>
</body>
</html>
"#;

/// Raw query string parameters; integers are parsed leniently afterwards
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub q: Option<String>,
    pub skip: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub format: Option<String>,
    pub blacklisted: Option<String>,
}

impl LeaderboardParams {
    pub fn view_query(&self) -> ViewQuery {
        ViewQuery {
            search: self.q.clone(),
            skip: lenient_int("skip", self.skip.as_deref()),
            size: lenient_int("size", self.size.as_deref()),
            excluded: self
                .blacklisted
                .as_deref()
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_param(self.format.as_deref())
    }
}

/// Parse an integer parameter, treating anything malformed as absent
fn lenient_int(key: &str, raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Ignoring non-integer query parameter {}={}", key, raw);
            None
        }
    }
}

fn csv_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], body).into_response()
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /status
pub async fn status() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

/// GET /leaderboard
pub async fn leaderboard(
    State(service): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<Response> {
    let board = service.board().await;
    let view = query::board_view(&board, &params.view_query());

    match params.output_format() {
        OutputFormat::Json => Ok(Json(view).into_response()),
        OutputFormat::Csv => Ok(csv_response(query::to_csv(
            &view.participants,
            &board.metadata.headers,
        )?)),
    }
}

/// GET /leaderboard/snapshots/:label
pub async fn snapshot(
    State(service): State<AppState>,
    Path(label): Path<String>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<Response> {
    let label: SnapshotLabel = label.parse().map_err(ApiError::BadRequest)?;
    let snapshot = service
        .snapshot(label)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("{} snapshot has not been captured", label)))?;

    let view = query::snapshot_view(&snapshot, &params.view_query());
    match params.output_format() {
        OutputFormat::Json => Ok(Json(view).into_response()),
        OutputFormat::Csv => {
            let headers = service.settings().metadata.headers.clone();
            Ok(csv_response(query::to_csv(&view.participants, &headers)?))
        }
    }
}
